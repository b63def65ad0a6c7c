use anyhow::{bail, Context, Result};
use clap::Parser;
use fnv::FnvHashMap;
use hashbrown::HashSet;
use osmpbfreader::{NodeId, OsmObj, OsmPbfReader, Tags};
use polynav::geo::{normalize, Point, UtmProjection};
use polynav::{PolyDocument, PolyEdge, PolyVertex};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "osm2poly")]
#[command(about = "Convert an OSM .pbf extract into a .poly street graph with projected planar coordinates.", long_about = None)]
struct Cli {
    /// Path to the .osm.pbf file
    #[arg(short, long)]
    pbf: PathBuf,

    /// Output .poly file. Defaults to the input path with a .poly extension.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// UTM zone (1-60). Inferred from the first node's longitude if omitted.
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=60))]
    zone: Option<u8>,

    /// Divide projected coordinates (meters) by this factor
    #[arg(short, long, default_value_t = 2.0)]
    reducer: f64,

    /// Only include 'highway' ways. If false, attempts to include all linear ways.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    only_highways: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
    Both,
}

/// Key lookup over a way's tags, so the filters below also work on plain
/// pairs.
trait WayTags {
    fn tag(&self, key: &str) -> Option<&str>;
}

impl WayTags for Tags {
    fn tag(&self, key: &str) -> Option<&str> {
        self.get(key).map(|v| v.as_str())
    }
}

impl WayTags for [(&str, &str)] {
    fn tag(&self, key: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == key).map(|&(_, v)| v)
    }
}

/// A way becomes street segments unless it is an `area=yes` polygon. With
/// `only_highways` it also needs a `highway` tag.
fn is_way_routable<T: WayTags + ?Sized>(tags: &T, only_highways: bool) -> bool {
    if only_highways && tags.tag("highway").is_none() {
        return false;
    }
    tags.tag("area") != Some("yes")
}

/// Travel direction relative to the way's node order. Roundabouts are one-way
/// even without an `oneway` tag.
fn way_direction<T: WayTags + ?Sized>(tags: &T) -> Direction {
    match tags.tag("oneway") {
        Some("yes" | "true" | "1") => Direction::Forward,
        Some("-1") => Direction::Backward,
        _ if tags.tag("junction") == Some("roundabout") => Direction::Forward,
        _ => Direction::Both,
    }
}

type RoutableWay = (Vec<NodeId>, Direction);

/// First pass: routable ways and every node id they reference.
fn collect_ways(path: &Path, only_highways: bool) -> Result<(Vec<RoutableWay>, HashSet<NodeId>)> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut needed: HashSet<NodeId> = HashSet::new();
    let mut ways = Vec::new();
    for obj in OsmPbfReader::new(file).iter() {
        if let OsmObj::Way(w) = obj? {
            if w.nodes.len() >= 2 && is_way_routable(&w.tags, only_highways) {
                needed.extend(w.nodes.iter().copied());
                ways.push((w.nodes, way_direction(&w.tags)));
            }
        }
    }
    Ok((ways, needed))
}

/// Second pass: `(lat, lon)` of the nodes in `needed`.
fn read_coordinates(path: &Path, needed: &HashSet<NodeId>) -> Result<FnvHashMap<NodeId, (f64, f64)>> {
    let file = File::open(path).with_context(|| format!("reopening {}", path.display()))?;
    let mut coords = FnvHashMap::default();
    for obj in OsmPbfReader::new(file).iter() {
        if let OsmObj::Node(n) = obj? {
            if needed.contains(&n.id) {
                coords.insert(n.id, (n.lat(), n.lon()));
            }
        }
    }
    Ok(coords)
}

/// Dense indices in the order the ways first reference each located node, so
/// the output is stable across runs.
fn assign_indices(
    ways: &[RoutableWay],
    coords: &FnvHashMap<NodeId, (f64, f64)>,
) -> (FnvHashMap<NodeId, usize>, Vec<(f64, f64)>) {
    let mut index: FnvHashMap<NodeId, usize> = FnvHashMap::default();
    let mut lat_lon = Vec::with_capacity(coords.len());
    for nid in ways.iter().flat_map(|(nodes, _)| nodes) {
        if let Some(&ll) = coords.get(nid) {
            index.entry(*nid).or_insert_with(|| {
                lat_lon.push(ll);
                lat_lon.len() - 1
            });
        }
    }
    (index, lat_lon)
}

/// One edge per consecutive node pair. Pairs with an unlocated node are
/// counted and dropped; zero-length repeats are dropped silently.
fn segment_edges(ways: &[RoutableWay], index: &FnvHashMap<NodeId, usize>) -> (Vec<PolyEdge>, usize) {
    let mut edges: Vec<PolyEdge> = Vec::new();
    let mut skipped = 0;
    for (nodes, direction) in ways {
        for pair in nodes.windows(2) {
            let (Some(&a), Some(&b)) = (index.get(&pair[0]), index.get(&pair[1])) else {
                skipped += 1;
                continue;
            };
            if a == b {
                continue;
            }
            let (from, to) = match direction {
                Direction::Backward => (b, a),
                Direction::Forward | Direction::Both => (a, b),
            };
            edges.push(PolyEdge {
                id: edges.len() as i64,
                from: from as i64,
                to: to as i64,
                directed: *direction != Direction::Both,
            });
        }
    }
    (edges, skipped)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if !(cli.reducer > 0.0) {
        bail!("--reducer must be positive, got {}", cli.reducer);
    }
    let out_path = cli
        .out
        .clone()
        .unwrap_or_else(|| cli.pbf.with_extension("poly"));

    let (ways, needed_nodes) = collect_ways(&cli.pbf, cli.only_highways)?;
    info!(
        ways = ways.len(),
        node_refs = needed_nodes.len(),
        "collected routable ways"
    );

    let coords = read_coordinates(&cli.pbf, &needed_nodes)?;
    if coords.is_empty() {
        bail!("no routable nodes found in {}", cli.pbf.display());
    }
    info!(nodes = coords.len(), "loaded coordinates");

    let (index, lat_lon) = assign_indices(&ways, &coords);

    let utm = match cli.zone {
        Some(zone) => UtmProjection::from_zone(zone),
        None => UtmProjection::for_longitude(lat_lon[0].1),
    };
    info!(central_meridian = utm.central_meridian(), "projecting to UTM");

    let mut points: Vec<Point> = lat_lon
        .iter()
        .map(|&(lat, lon)| utm.project(lat, lon))
        .collect();
    normalize(&mut points, cli.reducer);

    let (edges, skipped) = segment_edges(&ways, &index);
    if skipped > 0 {
        warn!(skipped, "segments dropped for missing node coordinates");
    }

    let doc = PolyDocument {
        vertices: points
            .into_iter()
            .enumerate()
            .map(|(i, point)| PolyVertex { id: i as i64, point })
            .collect(),
        edges,
    };

    let out = File::create(&out_path).with_context(|| format!("creating {}", out_path.display()))?;
    doc.write(BufWriter::new(out))
        .with_context(|| format!("writing {}", out_path.display()))?;

    info!(
        path = %out_path.display(),
        vertices = doc.vertices.len(),
        edges = doc.edges.len(),
        "wrote .poly graph"
    );
    println!("Created \"{}\"", out_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routable_ways() {
        let road: &[(&str, &str)] = &[("highway", "residential")];
        let plaza: &[(&str, &str)] = &[("highway", "pedestrian"), ("area", "yes")];
        let river: &[(&str, &str)] = &[("waterway", "river")];
        assert!(is_way_routable(road, true));
        assert!(!is_way_routable(plaza, true));
        assert!(!is_way_routable(plaza, false));
        assert!(!is_way_routable(river, true));
        assert!(is_way_routable(river, false));
    }

    #[test]
    fn direction_from_tags() {
        fn dir(tags: &[(&str, &str)]) -> Direction {
            way_direction(tags)
        }
        assert_eq!(dir(&[]), Direction::Both);
        assert_eq!(dir(&[("oneway", "yes")]), Direction::Forward);
        assert_eq!(dir(&[("oneway", "1")]), Direction::Forward);
        assert_eq!(dir(&[("oneway", "-1")]), Direction::Backward);
        assert_eq!(dir(&[("oneway", "no")]), Direction::Both);
        assert_eq!(dir(&[("junction", "roundabout")]), Direction::Forward);
        assert_eq!(
            dir(&[("oneway", "-1"), ("junction", "roundabout")]),
            Direction::Backward
        );
    }

    #[test]
    fn segments_follow_direction_and_skip_missing_nodes() {
        let n = NodeId;
        let ways = vec![
            (vec![n(7), n(8), n(9)], Direction::Both),
            (vec![n(9), n(8)], Direction::Backward),
            (vec![n(9), n(42), n(9)], Direction::Forward),
            (vec![n(7), n(7)], Direction::Forward),
        ];
        let coords: FnvHashMap<NodeId, (f64, f64)> =
            [n(7), n(8), n(9)].into_iter().map(|id| (id, (0.0, 0.0))).collect();

        let (index, lat_lon) = assign_indices(&ways, &coords);
        assert_eq!(lat_lon.len(), 3);
        assert_eq!((index[&n(7)], index[&n(8)], index[&n(9)]), (0, 1, 2));

        let (edges, skipped) = segment_edges(&ways, &index);
        assert_eq!(skipped, 2);
        let arcs: Vec<_> = edges.iter().map(|e| (e.id, e.from, e.to, e.directed)).collect();
        assert_eq!(
            arcs,
            vec![(0, 0, 1, false), (1, 1, 2, false), (2, 1, 2, true)]
        );
    }
}
