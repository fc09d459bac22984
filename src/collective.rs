//! The operations a worker group must provide to run the relaxation engine.
//!
//! Nothing in the engine reads another worker's state. Everything that crosses
//! a worker boundary goes through one of the calls on [`Collective`]: the
//! one-time setup broadcast and block scatter, one [`Collective::argmin`] per
//! round, and the final gather.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matrix::ColumnBlock;
use crate::{Weight, UNREACHABLE};

/// Rank that loads the matrix, scatters it and collects the results.
pub const COORDINATOR: usize = 0;

/// One worker's proposal for the next vertex to settle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub dist: Weight,
    pub vertex: Option<usize>,
}

impl Candidate {
    /// Contributed by a worker with no reachable unsettled vertex left.
    pub const NONE: Candidate = Candidate {
        dist: UNREACHABLE,
        vertex: None,
    };

    pub fn new(dist: Weight, vertex: usize) -> Candidate {
        Candidate {
            dist,
            vertex: Some(vertex),
        }
    }

    /// Minimum by distance, then by lowest global vertex id.
    ///
    /// A real vertex always beats [`Candidate::NONE`]. Blocks are contiguous, so
    /// the lowest vertex id also comes from the lowest contributing rank. Only
    /// the predecessor chosen among equally short paths depends on the tie-break;
    /// distances do not.
    pub fn combine(self, other: Candidate) -> Candidate {
        match (self.vertex, other.vertex) {
            (None, _) => other,
            (_, None) => self,
            (Some(mine), Some(theirs)) => {
                if (other.dist, theirs) < (self.dist, mine) {
                    other
                } else {
                    self
                }
            }
        }
    }

    /// Folds any number of proposals into the agreed winner.
    pub fn reduce(candidates: impl IntoIterator<Item = Candidate>) -> Candidate {
        candidates
            .into_iter()
            .fold(Candidate::NONE, Candidate::combine)
    }
}

impl Default for Candidate {
    fn default() -> Self {
        Candidate::NONE
    }
}

/// What the coordinator tells every worker before any round runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Setup {
    Run { vertices: usize },
    Abort,
}

/// A worker's final slice of the distance and predecessor arrays.
///
/// `dist[i]` and `pred[i]` describe global vertex `offset + i`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalResult {
    pub offset: usize,
    pub dist: Vec<Weight>,
    pub pred: Vec<Option<usize>>,
}

/// Collective operations over a fixed group of workers running in lockstep.
///
/// Every call is a barrier: no worker returns before every worker has made the
/// same call. Workers must therefore issue the same sequence of calls. A worker
/// that leaves the group early makes the pending and all later calls fail on
/// every other worker; there is no recovery.
pub trait Collective {
    fn rank(&self) -> usize;

    fn num_workers(&self) -> usize;

    fn is_coordinator(&self) -> bool {
        self.rank() == COORDINATOR
    }

    fn barrier(&self) -> Result<()>;

    /// The coordinator passes `Some`, everyone else `None`; all get the
    /// coordinator's value.
    fn broadcast(&self, setup: Option<Setup>) -> Result<Setup>;

    /// The coordinator passes one block per worker in rank order; each worker
    /// gets its own.
    fn scatter(&self, blocks: Option<Vec<ColumnBlock>>) -> Result<ColumnBlock>;

    /// Minimum-with-location reduction: every worker gets
    /// [`Candidate::reduce`] of all contributions.
    fn argmin(&self, local: Candidate) -> Result<Candidate>;

    /// The coordinator gets every worker's result in rank order, everyone else
    /// `None`.
    fn gather(&self, local: LocalResult) -> Result<Option<Vec<LocalResult>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_prefers_shorter_distance() {
        let a = Candidate::new(5, 1);
        let b = Candidate::new(3, 7);
        assert_eq!(a.combine(b), b);
        assert_eq!(b.combine(a), b);
    }

    #[test]
    fn test_combine_breaks_ties_by_vertex() {
        let a = Candidate::new(4, 6);
        let b = Candidate::new(4, 2);
        assert_eq!(a.combine(b), b);
        assert_eq!(b.combine(a), b);
    }

    #[test]
    fn test_none_never_wins() {
        let a = Candidate::new(9, 3);
        assert_eq!(Candidate::NONE.combine(a), a);
        assert_eq!(a.combine(Candidate::NONE), a);
        assert_eq!(Candidate::NONE.combine(Candidate::NONE), Candidate::NONE);
    }

    #[test]
    fn test_reduce_is_order_independent() {
        let candidates = [
            Candidate::NONE,
            Candidate::new(8, 4),
            Candidate::new(2, 9),
            Candidate::new(2, 5),
        ];
        let forward = Candidate::reduce(candidates);
        let backward = Candidate::reduce(candidates.iter().rev().copied());
        assert_eq!(forward, Candidate::new(2, 5));
        assert_eq!(forward, backward);
        assert_eq!(Candidate::reduce(std::iter::empty()), Candidate::NONE);
    }
}
