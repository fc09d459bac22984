//! The distributed relaxation loop.
//!
//! Every worker owns one column block and the matching slice of the `dist`,
//! `pred` and `known` arrays. A round is:
//!
//! 1. pick the closest unsettled owned vertex (or nothing),
//! 2. agree on the global winner with [`Collective::argmin`],
//! 3. stop if nobody had a reachable unsettled vertex left,
//! 4. the winner's owner settles it,
//! 5. everyone relaxes their unsettled vertices through the winner.
//!
//! The winner's row of outgoing weights is already part of every block (rows
//! are never split), so step 5 needs no extra communication.

use tracing::{debug, trace};

use crate::collective::{Candidate, Collective, LocalResult};
use crate::error::Result;
use crate::matrix::ColumnBlock;
use crate::partition::Partition;
use crate::{Weight, SOURCE, UNREACHABLE};

/// What one worker did during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundStats {
    /// Rounds executed, i.e. vertices settled after the source.
    pub rounds: usize,
    /// Vertices this worker settled, the source included if it owns it.
    pub settled_locally: usize,
    /// Whether the loop stopped because no reachable vertex was left.
    pub stopped_early: bool,
}

/// One worker's mutable share of the shortest-path state.
#[derive(Clone, Debug)]
pub struct LocalState {
    partition: Partition,
    rank: usize,
    dist: Vec<Weight>,
    pred: Vec<Option<usize>>,
    known: Vec<bool>,
}

impl LocalState {
    /// Starts every owned vertex at its direct distance from the source.
    ///
    /// The source's owner marks it settled at distance 0 with no predecessor.
    pub fn new(partition: Partition, rank: usize, block: &ColumnBlock) -> LocalState {
        let width = partition.block_width();
        let mut dist = block.row(SOURCE).to_vec();
        let mut pred = vec![Some(SOURCE); width];
        let mut known = vec![false; width];
        if partition.owner_of(SOURCE) == rank {
            let local = partition.local_index(SOURCE);
            dist[local] = 0;
            pred[local] = None;
            known[local] = true;
        }
        LocalState {
            partition,
            rank,
            dist,
            pred,
            known,
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn dist(&self) -> &[Weight] {
        &self.dist
    }

    pub fn pred(&self) -> &[Option<usize>] {
        &self.pred
    }

    pub fn known(&self) -> &[bool] {
        &self.known
    }

    pub fn settled(&self) -> usize {
        self.known.iter().filter(|&&known| known).count()
    }

    /// The closest unsettled owned vertex, lowest local index on ties.
    ///
    /// Unreached vertices are never proposed, so a worker whose remaining
    /// vertices are all cut off from the source contributes
    /// [`Candidate::NONE`].
    pub fn local_candidate(&self) -> Candidate {
        let mut best = Candidate::NONE;
        for (local, (&dist, &known)) in self.dist.iter().zip(&self.known).enumerate() {
            if !known && dist < best.dist {
                best = Candidate::new(dist, self.partition.global_index(self.rank, local));
            }
        }
        best
    }

    /// Marks `vertex` settled if this worker owns it. Returns whether it did.
    pub fn settle(&mut self, vertex: usize) -> bool {
        if self.partition.owner_of(vertex) != self.rank {
            return false;
        }
        self.known[self.partition.local_index(vertex)] = true;
        true
    }

    /// Relaxes every unsettled owned vertex through the settled `vertex`.
    ///
    /// Missing edges never produce an update, and path lengths saturate
    /// rather than wrap.
    pub fn relax(&mut self, block: &ColumnBlock, vertex: usize, vertex_dist: Weight) {
        let row = block.row(vertex);
        for (local, &weight) in row.iter().enumerate() {
            if self.known[local] || weight == UNREACHABLE {
                continue;
            }
            let through = vertex_dist.saturating_add(weight);
            if through < self.dist[local] {
                self.dist[local] = through;
                self.pred[local] = Some(vertex);
            }
        }
    }

    pub fn into_result(self) -> LocalResult {
        LocalResult {
            offset: self.partition.owned_range(self.rank).start,
            dist: self.dist,
            pred: self.pred,
        }
    }
}

/// Runs one full round: propose, agree, settle, relax.
///
/// Returns the agreed winner; [`Candidate::NONE`] means the loop is over and
/// nothing was changed.
pub fn run_round<C: Collective>(
    comm: &C,
    state: &mut LocalState,
    block: &ColumnBlock,
) -> Result<Candidate> {
    let winner = comm.argmin(state.local_candidate())?;
    if let Some(vertex) = winner.vertex {
        state.settle(vertex);
        state.relax(block, vertex, winner.dist);
    }
    Ok(winner)
}

/// Drives [`run_round`] until every reachable vertex is settled.
///
/// At most `n - 1` rounds run, fewer when part of the graph cannot be reached
/// from the source. Every worker in the group must call this with the same
/// partition.
pub fn run_rounds<C: Collective>(
    comm: &C,
    partition: Partition,
    block: &ColumnBlock,
) -> Result<(LocalResult, RoundStats)> {
    let mut state = LocalState::new(partition, comm.rank(), block);
    let mut stats = RoundStats::default();

    for round in 0..partition.vertices() - 1 {
        let winner = run_round(comm, &mut state, block)?;
        match winner.vertex {
            Some(vertex) => {
                trace!(rank = comm.rank(), round, vertex, dist = winner.dist, "settled");
                stats.rounds += 1;
            }
            None => {
                debug!(rank = comm.rank(), round, "no reachable vertex left");
                stats.stopped_early = true;
                break;
            }
        }
    }
    stats.settled_locally = state.settled();
    debug!(
        rank = comm.rank(),
        rounds = stats.rounds,
        settled = stats.settled_locally,
        "relaxation finished"
    );
    Ok((state.into_result(), stats))
}
