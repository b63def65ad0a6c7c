use std::fmt;
use std::io::Write;

use ordered_float::OrderedFloat;

use crate::dijkstra::ShortestPath;
use crate::error::Result;
use crate::graph::VertexId;
use crate::poly::LoadedGraph;

/// Human-readable result of a single source/target query.
pub struct Report<'a> {
    loaded: &'a LoadedGraph,
    result: &'a ShortestPath,
    path: Vec<VertexId>,
}

impl<'a> Report<'a> {
    pub fn new(loaded: &'a LoadedGraph, result: &'a ShortestPath) -> Result<Self> {
        let path = if result.is_reachable() {
            result.path()?
        } else {
            Vec::new()
        };
        Ok(Self {
            loaded,
            result,
            path,
        })
    }

    pub fn path(&self) -> &[VertexId] {
        &self.path
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = self.result.target.unwrap_or(self.result.source);
        match self.result.cost() {
            None => writeln!(
                f,
                "No path exists between {} and {}",
                self.result.source, target
            )?,
            Some(cost) => {
                writeln!(f, "Total path cost: {:.2} units", cost)?;
                writeln!(f, "Nodes explored: {}", self.result.nodes_explored)?;
                writeln!(f)?;
                writeln!(f, "Path (start to end):")?;
                for &v in &self.path {
                    let Some(vertex) = self.loaded.graph.vertex(v) else {
                        continue;
                    };
                    let external = self.loaded.external(v).unwrap_or(v as i64);
                    writeln!(
                        f,
                        "{} (id={}, x={:.3}, y={:.3})",
                        v, external, vertex.point.x, vertex.point.y
                    )?;
                }
            }
        }
        writeln!(f)?;
        writeln!(
            f,
            "Execution time: {:.4} seconds",
            self.result.elapsed.as_secs_f64()
        )
    }
}

/// Writes one CSV row per path vertex with the running cost.
pub fn write_path_csv<W: Write>(
    loaded: &LoadedGraph,
    result: &ShortestPath,
    path: &[VertexId],
    out: W,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["step", "vertex", "external_id", "x", "y", "cumulative_cost"])
        .map_err(std::io::Error::from)?;
    for (step, &v) in path.iter().enumerate() {
        let Some(vertex) = loaded.graph.vertex(v) else {
            continue;
        };
        let external = loaded.external(v).unwrap_or(v as i64);
        wtr.write_record(&[
            step.to_string(),
            v.to_string(),
            external.to_string(),
            format!("{:.6}", vertex.point.x),
            format!("{:.6}", vertex.point.y),
            format!("{:.6}", result.distance(v)),
        ])
        .map_err(std::io::Error::from)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Summary of a one-to-all sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct SweepSummary {
    pub vertices: usize,
    pub reachable: usize,
    pub farthest: Option<(VertexId, f64)>,
}

impl SweepSummary {
    pub fn from_result(result: &ShortestPath) -> Self {
        let reachable = result.distances.iter().filter(|d| d.is_finite()).count();
        let farthest = result
            .distances
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, d)| d.is_finite())
            .max_by_key(|&(_, d)| OrderedFloat(d));
        Self {
            vertices: result.distances.len(),
            reachable,
            farthest,
        }
    }
}

impl fmt::Display for SweepSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vertices: {}", self.vertices)?;
        writeln!(f, "Reachable: {}", self.reachable)?;
        if let Some((v, d)) = self.farthest {
            writeln!(f, "Farthest reachable vertex: {} at {:.2} units", v, d)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dijkstra::{shortest_path, ShortestPathEngine};
    use crate::poly::PolyDocument;

    fn loaded() -> LoadedGraph {
        let text = "4 2 0 1\n10 0 0\n20 3 0\n30 3 4\n40 50 50\n2 1\n0 10 20 0\n1 20 30 0\n0\n";
        PolyDocument::parse_str(text).unwrap().into_graph().unwrap()
    }

    #[test]
    fn report_lists_path_with_coordinates() {
        let loaded = loaded();
        let result = shortest_path(&loaded.graph, 0, 2).unwrap();
        let report = Report::new(&loaded, &result).unwrap();
        assert_eq!(report.path(), &[0, 1, 2]);

        let text = report.to_string();
        assert!(text.starts_with("Total path cost: 7.00 units\nNodes explored: 3\n"));
        assert!(text.contains("1 (id=20, x=3.000, y=0.000)\n"));
        assert!(text.contains("Execution time: "));
    }

    #[test]
    fn report_for_missing_path() {
        let loaded = loaded();
        let result = shortest_path(&loaded.graph, 0, 3).unwrap();
        let report = Report::new(&loaded, &result).unwrap();
        assert!(report.path().is_empty());
        assert!(report.to_string().starts_with("No path exists between 0 and 3\n"));
    }

    #[test]
    fn csv_has_running_cost() {
        let loaded = loaded();
        let result = shortest_path(&loaded.graph, 0, 2).unwrap();
        let path = result.path().unwrap();
        let mut buf = Vec::new();
        write_path_csv(&loaded, &result, &path, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "step,vertex,external_id,x,y,cumulative_cost");
        assert_eq!(lines[3], "2,2,30,3.000000,4.000000,7.000000");
    }

    #[test]
    fn sweep_summary_picks_farthest() {
        let loaded = loaded();
        let result = ShortestPathEngine::new(&loaded.graph).search_all(0).unwrap();
        let summary = SweepSummary::from_result(&result);
        assert_eq!(
            summary,
            SweepSummary {
                vertices: 4,
                reachable: 3,
                farthest: Some((2, 7.0)),
            }
        );
    }
}
