use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::debug;

use blkcol_dijkstra::input::DEFAULT_INFINITY;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// One OS thread per worker, in this process.
    Threads,
    /// One lamellar PE per worker.
    Lamellar,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct DijkstraCli {
    /// Matrix file: the vertex count, then n*n weights. Reads stdin if absent.
    #[arg(short, long, conflicts_with = "generate")]
    pub input: Option<PathBuf>,

    #[arg(value_enum, short, long, default_value_t = Backend::Threads)]
    pub backend: Backend,

    /// Worker threads for the threads backend. Must divide the vertex count.
    #[arg(short, long, default_value_t = 1)]
    pub workers: usize,

    /// Input weights at or above this value mean "no edge".
    #[arg(long, default_value_t = DEFAULT_INFINITY)]
    pub infinity: i64,

    /// Use a random graph with this many vertices instead of reading one.
    #[arg(short, long)]
    pub generate: Option<usize>,

    #[arg(long, default_value_t = 0.3)]
    pub edge_probability: f64,

    #[arg(long, default_value_t = 100)]
    pub max_weight: u64,

    #[arg(short, long, default_value_t = 0)]
    pub seed: u64,

    /// Also write the result as JSON to this file.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Check the result against a serial Dijkstra.
    #[arg(long)]
    pub verify: bool,

    #[arg(long)]
    pub print_matrix: bool,

    /// Do not print the distance and path tables.
    #[arg(short, long)]
    pub quiet: bool,
}

impl DijkstraCli {
    pub fn describe(&self) {
        debug!("input: {:?}", self.input);
        debug!("backend: {:?}", self.backend);
        debug!("workers: {}", self.workers);
        debug!("infinity: {}", self.infinity);
        if let Some(vertices) = self.generate {
            debug!(
                "generate: {vertices} vertices, p={} max weight {} seed {}",
                self.edge_probability, self.max_weight, self.seed
            );
        }
        debug!("json: {:?}", self.json);
        debug!("verify: {}", self.verify);
    }
}
