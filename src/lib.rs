//! Distributed single-source shortest paths over a dense adjacency matrix.
//!
//! The matrix is cut into contiguous column blocks, one per worker (PE). Each
//! round every worker proposes its closest unsettled vertex, the group agrees on
//! a single winner through a minimum-with-location reduction, and every worker
//! relaxes the vertices it owns against that winner.
//!
//! Two worker groups are provided: an in-process [`threads::ThreadGroup`], and
//! (with the `lamellar` feature) a [`lamellar_comm::LamellarComm`] that runs one
//! worker per lamellar PE.

pub mod collective;
pub mod driver;
pub mod engine;
pub mod error;
pub mod generate;
pub mod input;
#[cfg(feature = "lamellar")]
pub mod lamellar_comm;
pub mod matrix;
pub mod partition;
pub mod reference;
pub mod report;
pub mod threads;

/// Edge weights and path lengths.
pub type Weight = u64;

/// "No edge" in the matrix, "not reached" in a distance array.
///
/// Compares larger than every finite weight and is never used as an addend.
pub const UNREACHABLE: Weight = Weight::MAX;

/// Every run computes paths from this vertex.
pub const SOURCE: usize = 0;

pub use collective::{Candidate, Collective, LocalResult, Setup};
pub use driver::{run_worker, solve};
pub use engine::{LocalState, RoundStats};
pub use error::{Result, SsspError};
pub use matrix::{ColumnBlock, DenseMatrix};
pub use partition::Partition;
pub use report::ShortestPaths;
pub use threads::{ThreadComm, ThreadGroup};
