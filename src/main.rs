use anyhow::{bail, Context, Result};
use clap::Parser;
use polynav::reference::DenseMatrix;
use polynav::report::{write_path_csv, Report, SweepSummary};
use polynav::{load_poly, ShortestPath, ShortestPathEngine};
use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "route")]
#[command(about = "Load a .poly street graph and find the shortest path between two vertices.", long_about = None)]
struct Cli {
    /// Path to the .poly file
    poly: PathBuf,

    /// Source vertex (internal index, 0..N-1). Prompted for on stdin when
    /// neither this nor --input is given.
    #[arg(short, long)]
    source: Option<usize>,

    /// Target vertex (internal index, 0..N-1)
    #[arg(short, long)]
    target: Option<usize>,

    /// File holding the source and target indices, whitespace separated
    #[arg(short, long, conflicts_with_all = ["source", "target"])]
    input: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Also export the path as CSV (step, vertex, external_id, x, y, cumulative_cost)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Ignore the target and compute distances to every vertex
    #[arg(long, default_value_t = false)]
    all: bool,

    /// Re-run the query on the O(V^2) dense-matrix search and compare costs
    #[arg(long, default_value_t = false)]
    cross_check: bool,
}

fn read_query_file(path: &Path) -> Result<(usize, usize)> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut nums = text.split_whitespace().map(str::parse::<usize>);
    match (nums.next(), nums.next()) {
        (Some(Ok(source)), Some(Ok(target))) => Ok((source, target)),
        _ => bail!("{} must contain a source and a target index", path.display()),
    }
}

/// Asks for one vertex index in `0..n`, asking again after anything that is
/// not one. Running out of input is an error.
fn prompt_vertex<R: BufRead, W: Write>(input: &mut R, prompt: &mut W, label: &str, n: usize) -> Result<usize> {
    let mut line = String::new();
    loop {
        write!(prompt, "{} vertex (0 to {}): ", label, n.saturating_sub(1))?;
        prompt.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            bail!("input ended before a {} vertex was given", label.to_lowercase());
        }
        match line.trim().parse::<usize>() {
            Ok(v) if v < n => return Ok(v),
            _ => writeln!(prompt, "not a vertex index: {:?}", line.trim())?,
        }
    }
}

/// Interactive fallback when neither `--source` nor `--input` is given.
fn prompt_query<R: BufRead, W: Write>(mut input: R, mut prompt: W, n: usize) -> Result<(usize, usize)> {
    let source = prompt_vertex(&mut input, &mut prompt, "Source", n)?;
    let target = prompt_vertex(&mut input, &mut prompt, "Target", n)?;
    Ok((source, target))
}

fn cross_check(engine_result: &ShortestPath, matrix: &DenseMatrix) {
    let oracle = matrix.shortest_from(engine_result.source);
    let targets: Vec<usize> = match engine_result.target {
        Some(t) => vec![t],
        None => (0..oracle.distances.len()).collect(),
    };
    let mut mismatches = 0;
    for t in targets {
        let (a, b) = (engine_result.distance(t), oracle.distances[t]);
        let agree = (a.is_infinite() && b.is_infinite()) || (a - b).abs() <= 1e-9 * a.abs().max(1.0);
        if !agree {
            mismatches += 1;
            warn!(vertex = t, engine = a, reference = b, "cost mismatch");
        }
    }
    info!(mismatches, "cross-check finished");
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let loaded = load_poly(&cli.poly).with_context(|| format!("loading {}", cli.poly.display()))?;
    let graph = &loaded.graph;
    info!(
        vertices = graph.vertex_count(),
        arcs = graph.arc_count(),
        "graph ready"
    );

    let n = graph.capacity();
    if n == 0 {
        bail!("{} has no vertices", cli.poly.display());
    }
    let (source, target) = match (&cli.input, cli.source, cli.target) {
        (Some(path), _, _) => {
            let (s, t) = read_query_file(path)?;
            (s, Some(t))
        }
        (None, Some(s), t) => (s, t),
        (None, None, _) => {
            let (s, t) = prompt_query(io::stdin().lock(), io::stderr(), n)?;
            (s, Some(t))
        }
    };
    if source >= n || target.is_some_and(|t| t >= n) {
        bail!("vertex indices must be between 0 and {}", n.saturating_sub(1));
    }

    let mut engine = ShortestPathEngine::new(graph);
    let result = match target {
        Some(t) if !cli.all => engine.search(source, t)?,
        _ => engine.search_all(source)?,
    };

    if cli.cross_check {
        cross_check(&result, &DenseMatrix::from_graph(graph));
    }

    let mut out: Box<dyn Write> = match &cli.out {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    if result.target.is_none() {
        write!(out, "{}", SweepSummary::from_result(&result))?;
        out.flush()?;
        return Ok(());
    }

    let report = Report::new(&loaded, &result)?;
    write!(out, "{}", report)?;
    out.flush()?;

    if let Some(csv_path) = &cli.csv {
        if report.path().is_empty() {
            warn!("no path, skipping CSV export");
        } else {
            let file = File::create(csv_path)
                .with_context(|| format!("creating CSV {}", csv_path.display()))?;
            write_path_csv(&loaded, &result, report.path(), file)?;
            info!(path = %csv_path.display(), steps = report.path().len(), "wrote path CSV");
        }
    }

    Ok(())
}
