//! In-process worker group: one OS thread per worker.
//!
//! Collectives go through a shared slot table (one slot per rank) and a
//! reusable barrier. Each collective is "deposit, barrier, read, barrier"; the
//! second barrier keeps a fast worker from overwriting a slot that a slow one
//! has not read yet.

use std::any::Any;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::collective::{Candidate, Collective, LocalResult, Setup, COORDINATOR};
use crate::error::{Result, SsspError};
use crate::matrix::ColumnBlock;

type Slot = Option<Box<dyn Any + Send>>;

#[derive(Debug, Default)]
struct GateState {
    arrived: usize,
    generation: u64,
    departed: Option<usize>,
}

/// A barrier that fails instead of hanging once any worker has left.
#[derive(Debug, Default)]
struct Gate {
    state: Mutex<GateState>,
    released: Condvar,
}

impl Gate {
    fn wait(&self, workers: usize) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(rank) = state.departed {
            return Err(departed(rank));
        }
        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == workers {
            state.arrived = 0;
            state.generation += 1;
            self.released.notify_all();
            return Ok(());
        }
        while state.generation == generation && state.departed.is_none() {
            self.released.wait(&mut state);
        }
        match state.departed {
            Some(rank) if state.generation == generation => Err(departed(rank)),
            _ => Ok(()),
        }
    }

    fn depart(&self, rank: usize) {
        let mut state = self.state.lock();
        state.departed.get_or_insert(rank);
        self.released.notify_all();
    }
}

fn departed(rank: usize) -> SsspError {
    SsspError::Collective(format!("worker {rank} left the group"))
}

struct Exchange {
    slots: Mutex<Vec<Slot>>,
    gate: Gate,
}

/// A fixed number of workers that run a closure in lockstep.
#[derive(Clone, Copy, Debug)]
pub struct ThreadGroup {
    workers: usize,
}

impl ThreadGroup {
    pub fn new(workers: usize) -> Result<ThreadGroup> {
        if workers == 0 {
            return Err(SsspError::ZeroWorkers);
        }
        Ok(ThreadGroup { workers })
    }

    /// Runs `work` once per worker, each on its own thread, and returns the
    /// results in rank order.
    ///
    /// A panicking worker is re-raised here after the others have been released
    /// from whatever collective they were blocked in.
    pub fn run<F, R>(&self, work: F) -> Vec<R>
    where
        F: Fn(ThreadComm) -> R + Sync,
        R: Send,
    {
        let exchange = Arc::new(Exchange {
            slots: Mutex::new((0..self.workers).map(|_| None).collect()),
            gate: Gate::default(),
        });
        debug!(workers = self.workers, "starting thread group");
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.workers)
                .map(|rank| {
                    let comm = ThreadComm {
                        rank,
                        workers: self.workers,
                        exchange: exchange.clone(),
                    };
                    let work = &work;
                    scope.spawn(move || work(comm))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        })
    }
}

/// One worker's handle on a [`ThreadGroup`].
///
/// Dropping the handle takes the worker out of the group; any collective
/// another worker is still blocked in then fails rather than hanging.
pub struct ThreadComm {
    rank: usize,
    workers: usize,
    exchange: Arc<Exchange>,
}

impl ThreadComm {
    fn deposit<T: Send + 'static>(&self, slot: usize, value: T) {
        self.exchange.slots.lock()[slot] = Some(Box::new(value));
    }

    fn take<T: 'static>(&self, slot: usize) -> Result<T> {
        let value = self.exchange.slots.lock()[slot].take();
        value
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
            .ok_or_else(|| self.missing(slot))
    }

    fn peek<T: Clone + 'static>(&self, slot: usize) -> Result<T> {
        let slots = self.exchange.slots.lock();
        slots[slot]
            .as_ref()
            .and_then(|boxed| boxed.downcast_ref::<T>())
            .cloned()
            .ok_or_else(|| self.missing(slot))
    }

    fn missing(&self, slot: usize) -> SsspError {
        SsspError::Collective(format!(
            "worker {} found no value of the expected type in slot {slot}",
            self.rank
        ))
    }

    fn sync(&self) -> Result<()> {
        self.exchange.gate.wait(self.workers)
    }

    /// Second half of every collective: wait until everyone has read, then hand
    /// back what this worker computed. The wait happens even when the read
    /// failed so the rest of the group is not left behind.
    fn finish<T>(&self, outcome: Result<T>) -> Result<T> {
        self.sync()?;
        outcome
    }
}

impl Collective for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn num_workers(&self) -> usize {
        self.workers
    }

    fn barrier(&self) -> Result<()> {
        self.sync()
    }

    fn broadcast(&self, setup: Option<Setup>) -> Result<Setup> {
        if self.is_coordinator() {
            match setup {
                Some(setup) => self.deposit(COORDINATOR, setup),
                None => warn!("coordinator has nothing to broadcast"),
            }
        }
        self.sync()?;
        let outcome = self.peek::<Setup>(COORDINATOR);
        self.finish(outcome)
    }

    fn scatter(&self, blocks: Option<Vec<ColumnBlock>>) -> Result<ColumnBlock> {
        if self.is_coordinator() {
            match blocks {
                Some(blocks) if blocks.len() == self.workers => {
                    for (rank, block) in blocks.into_iter().enumerate() {
                        self.deposit(rank, block);
                    }
                }
                Some(blocks) => warn!(
                    blocks = blocks.len(),
                    workers = self.workers,
                    "block count does not match the group size"
                ),
                None => warn!("coordinator has nothing to scatter"),
            }
        }
        self.sync()?;
        let outcome = self.take::<ColumnBlock>(self.rank);
        self.finish(outcome)
    }

    fn argmin(&self, local: Candidate) -> Result<Candidate> {
        self.deposit(self.rank, local);
        self.sync()?;
        let outcome = (0..self.workers)
            .map(|rank| self.peek::<Candidate>(rank))
            .collect::<Result<Vec<_>>>()
            .map(Candidate::reduce);
        self.finish(outcome)
    }

    fn gather(&self, local: LocalResult) -> Result<Option<Vec<LocalResult>>> {
        self.deposit(self.rank, local);
        self.sync()?;
        let outcome = if self.is_coordinator() {
            (0..self.workers)
                .map(|rank| self.take::<LocalResult>(rank))
                .collect::<Result<Vec<_>>>()
                .map(Some)
        } else {
            Ok(None)
        };
        self.finish(outcome)
    }
}

impl Drop for ThreadComm {
    fn drop(&mut self) {
        self.exchange.gate.depart(self.rank);
    }
}
