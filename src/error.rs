use thiserror::Error;

use crate::Weight;

/// Everything that can stop a run.
///
/// The precondition variants are all raised before the first relaxation
/// round, so a failed run never leaves partial output behind.
#[derive(Debug, Error)]
pub enum SsspError {
    #[error("the graph must contain at least one vertex")]
    ZeroVertices,

    #[error("the worker group must contain at least one worker")]
    ZeroWorkers,

    #[error("{vertices} vertices cannot be split evenly across {workers} workers")]
    Indivisible { vertices: usize, workers: usize },

    #[error("matrix must be square: expected {expected} entries, got {found}")]
    NotSquare { expected: usize, found: usize },

    #[error("negative weight {value} on edge {row} -> {col}")]
    NegativeWeight { row: usize, col: usize, value: i64 },

    #[error("vertex {vertex} has self-loop weight {weight}, expected 0")]
    MissingSelfLoop { vertex: usize, weight: Weight },

    #[error("could not parse token {token:?} at position {position}")]
    Parse { position: usize, token: String },

    #[error("input ended early: expected {expected} numbers, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("gathered {found} results for {expected} vertices")]
    ResultShape { expected: usize, found: usize },

    #[error("coordinator aborted the run before the first round")]
    Aborted,

    #[error("collective operation failed: {0}")]
    Collective(String),

    #[error("vertex {vertex}: distributed distance {found} differs from serial distance {expected}")]
    VerificationFailed {
        vertex: usize,
        expected: Weight,
        found: Weight,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SsspError>;
