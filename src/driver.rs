//! The program every worker runs: setup, scatter, relax, gather.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::collective::{Collective, Setup};
use crate::engine;
use crate::error::{Result, SsspError};
use crate::matrix::DenseMatrix;
use crate::partition::Partition;
use crate::report::ShortestPaths;
use crate::threads::ThreadGroup;

/// Checks everything the relaxation loop assumes, on the coordinator only.
fn check_input(matrix: Option<&DenseMatrix>, workers: usize) -> Result<usize> {
    let matrix = matrix.ok_or_else(|| {
        SsspError::Collective("the coordinator was started without a matrix".to_string())
    })?;
    matrix.validate()?;
    Partition::new(matrix.vertices(), workers)?;
    Ok(matrix.vertices())
}

/// Runs one worker's share of a distributed shortest-path computation.
///
/// Every worker in the group must call this. Only the coordinator needs the
/// matrix (others pass `None`) and only the coordinator gets the assembled
/// result back; everyone else returns `Ok(None)`.
///
/// The coordinator validates the matrix and the worker count before anything
/// else happens and broadcasts its verdict. If it aborts, no worker runs a
/// single round: the coordinator returns the precondition that failed and
/// everyone else [`SsspError::Aborted`].
pub fn run_worker<C: Collective>(
    comm: &C,
    matrix: Option<&DenseMatrix>,
) -> Result<Option<ShortestPaths>> {
    let mut rejected = None;
    let setup = if comm.is_coordinator() {
        match check_input(matrix, comm.num_workers()) {
            Ok(vertices) => Some(Setup::Run { vertices }),
            Err(err) => {
                warn!(error = %err, "aborting before the first round");
                rejected = Some(err);
                Some(Setup::Abort)
            }
        }
    } else {
        None
    };

    let vertices = match comm.broadcast(setup)? {
        Setup::Run { vertices } => vertices,
        Setup::Abort => return Err(rejected.unwrap_or(SsspError::Aborted)),
    };
    let partition = Partition::new(vertices, comm.num_workers())?;

    let start = Instant::now();
    let blocks = match matrix {
        Some(matrix) if comm.is_coordinator() => Some(partition.split(matrix)?),
        _ => None,
    };
    let block = comm.scatter(blocks)?;
    debug!(
        rank = comm.rank(),
        offset = block.offset(),
        width = block.width(),
        elapsed = ?start.elapsed(),
        "received column block"
    );

    let start = Instant::now();
    let (local, stats) = engine::run_rounds(comm, partition, &block)?;
    if comm.is_coordinator() {
        info!(
            vertices,
            workers = comm.num_workers(),
            rounds = stats.rounds,
            stopped_early = stats.stopped_early,
            elapsed = ?start.elapsed(),
            "shortest paths computed"
        );
    }

    comm.gather(local)?
        .map(|parts| ShortestPaths::from_parts(&partition, parts))
        .transpose()
}

/// Runs the whole computation on an in-process group of `workers` threads.
pub fn solve(matrix: &DenseMatrix, workers: usize) -> Result<ShortestPaths> {
    let group = ThreadGroup::new(workers)?;
    let mut outcomes = group
        .run(|comm| run_worker(&comm, comm.is_coordinator().then_some(matrix)))
        .into_iter();
    match outcomes.next() {
        Some(Ok(Some(paths))) => Ok(paths),
        Some(Err(err)) => Err(err),
        Some(Ok(None)) | None => Err(SsspError::Collective(
            "the coordinator returned no result".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UNREACHABLE;

    #[test]
    fn test_only_coordinator_gets_results() {
        let m = DenseMatrix::from_edges(4, &[(0, 1, 1), (0, 3, 4), (1, 2, 2)]);
        let group = ThreadGroup::new(2).unwrap();
        let outcomes = group.run(|comm| run_worker(&comm, comm.is_coordinator().then_some(&m)));
        let paths = outcomes[0].as_ref().unwrap().as_ref().unwrap();
        assert_eq!(paths.dist(), &[0, 1, 3, 4]);
        assert!(matches!(outcomes[1], Ok(None)));
    }

    #[test]
    fn test_abort_reaches_every_worker() {
        let m = DenseMatrix::from_edges(3, &[(0, 1, 1)]);
        let group = ThreadGroup::new(2).unwrap();
        let outcomes = group.run(|comm| run_worker(&comm, comm.is_coordinator().then_some(&m)));
        assert!(matches!(
            outcomes[0],
            Err(SsspError::Indivisible {
                vertices: 3,
                workers: 2
            })
        ));
        assert!(matches!(outcomes[1], Err(SsspError::Aborted)));
    }

    #[test]
    fn test_invalid_matrix_aborts() {
        let m = DenseMatrix::new(2, vec![0, 1, 1, 4]).unwrap();
        assert!(matches!(
            solve(&m, 1),
            Err(SsspError::MissingSelfLoop { vertex: 1, .. })
        ));
    }

    #[test]
    fn test_missing_matrix_aborts() {
        let group = ThreadGroup::new(2).unwrap();
        let outcomes = group.run(|comm| run_worker(&comm, None));
        assert!(matches!(outcomes[0], Err(SsspError::Collective(_))));
        assert!(matches!(outcomes[1], Err(SsspError::Aborted)));
    }

    #[test]
    fn test_solve_disconnected() {
        let m = DenseMatrix::from_edges(4, &[(0, 1, 1), (1, 2, 2), (3, 0, 1)]);
        let paths = solve(&m, 4).unwrap();
        assert_eq!(paths.dist(), &[0, 1, 3, UNREACHABLE]);
        assert_eq!(paths.path_to(3), None);
    }
}
