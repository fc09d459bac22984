mod options;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blkcol_dijkstra::generate::RandomGraph;
use blkcol_dijkstra::{input, reference, report, DenseMatrix, ShortestPaths};
use options::{Backend, DijkstraCli};

/// Reads or generates the matrix, printing it if asked to.
fn prepare_matrix(cli: &DijkstraCli) -> anyhow::Result<DenseMatrix> {
    let matrix = match cli.generate {
        Some(vertices) => RandomGraph {
            vertices,
            edge_probability: cli.edge_probability,
            max_weight: cli.max_weight,
            seed: cli.seed,
        }
        .build(),
        None => {
            let source = match &cli.input {
                Some(path) => path.display().to_string(),
                None => "stdin".to_string(),
            };
            input::load(cli.input.as_deref(), cli.infinity)
                .with_context(|| format!("failed to read a matrix from {source}"))?
        }
    };
    info!(vertices = matrix.vertices(), "matrix ready");
    if cli.print_matrix {
        report::write_matrix(&matrix, &mut std::io::stdout().lock())?;
    }
    Ok(matrix)
}

fn print_results(
    cli: &DijkstraCli,
    matrix: &DenseMatrix,
    paths: &ShortestPaths,
) -> anyhow::Result<()> {
    if cli.verify {
        reference::verify(matrix, paths).context("result does not match serial dijkstra")?;
        info!("result matches serial dijkstra");
    }
    if let Some(path) = &cli.json {
        paths
            .write_json(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    if !cli.quiet {
        let mut out = std::io::stdout().lock();
        paths.write_dists(&mut out)?;
        paths.write_paths(&mut out)?;
    }
    Ok(())
}

fn run_threads(cli: &DijkstraCli) -> anyhow::Result<()> {
    cli.describe();
    let matrix = prepare_matrix(cli)?;
    let paths = blkcol_dijkstra::solve(&matrix, cli.workers)
        .with_context(|| format!("shortest path run on {} threads failed", cli.workers))?;
    print_results(cli, &matrix, &paths)
}

#[cfg(feature = "lamellar")]
fn run_lamellar(cli: &DijkstraCli) -> anyhow::Result<()> {
    use blkcol_dijkstra::lamellar_comm::LamellarComm;
    use blkcol_dijkstra::{run_worker, Collective};

    let world = lamellar::LamellarWorldBuilder::new().build();
    let comm = LamellarComm::new(world)?;
    if comm.is_coordinator() {
        cli.describe();
    }

    // a coordinator that fails to load still joins the setup broadcast, so
    // the other PEs abort instead of waiting on it
    let loaded = comm.is_coordinator().then(|| prepare_matrix(cli));
    let outcome = run_worker(&comm, loaded.as_ref().and_then(|m| m.as_ref().ok()));
    match (loaded, outcome) {
        (Some(Err(err)), _) => Err(err),
        (_, Err(err)) => Err(anyhow::Error::new(err).context(format!(
            "shortest path run on PE {} failed",
            comm.rank()
        ))),
        (Some(Ok(matrix)), Ok(Some(paths))) => print_results(cli, &matrix, &paths),
        _ => Ok(()),
    }
}

#[cfg(not(feature = "lamellar"))]
fn run_lamellar(_cli: &DijkstraCli) -> anyhow::Result<()> {
    anyhow::bail!("this binary was built without the `lamellar` feature")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = DijkstraCli::parse();
    match cli.backend {
        Backend::Threads => run_threads(&cli),
        Backend::Lamellar => run_lamellar(&cli),
    }
}
