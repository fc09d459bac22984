//! One worker per lamellar PE.
//!
//! Every collective follows the same shape: clear the local landing slot,
//! barrier, send active messages that write into the slots on their target
//! PEs, `wait_all`, barrier, read the local slot. The first barrier keeps a
//! fast PE from writing into a slot its owner has not cleared yet.

use lamellar::active_messaging::prelude::*;
use lamellar::darc::prelude::*;
use lamellar::LamellarWorld;

use tracing::warn;

use crate::collective::{Candidate, Collective, LocalResult, Setup, COORDINATOR};
use crate::error::{Result, SsspError};
use crate::matrix::ColumnBlock;

/// Folds the sender's candidate into the receiver's running winner.
#[lamellar::AmData(Debug, Clone)]
pub struct ArgminAm {
    pub candidate: Candidate,
    pub winner: LocalRwDarc<Candidate>,
}

#[lamellar::am]
impl LamellarAM for ArgminAm {
    async fn exec(self) {
        let mut winner = self.winner.write();
        let merged = winner.combine(self.candidate);
        **winner = merged;
    }
}

#[lamellar::AmData(Debug, Clone)]
pub struct SetupAm {
    pub setup: Setup,
    pub slot: LocalRwDarc<Option<Setup>>,
}

#[lamellar::am]
impl LamellarAM for SetupAm {
    async fn exec(self) {
        **self.slot.write() = Some(self.setup);
    }
}

#[lamellar::AmData(Debug, Clone)]
pub struct BlockAm {
    pub block: ColumnBlock,
    pub slot: LocalRwDarc<Option<ColumnBlock>>,
}

#[lamellar::am]
impl LamellarAM for BlockAm {
    async fn exec(self) {
        **self.slot.write() = Some(self.block.clone());
    }
}

#[lamellar::AmData(Debug, Clone)]
pub struct ResultAm {
    pub rank: usize,
    pub result: LocalResult,
    pub slots: LocalRwDarc<Vec<Option<LocalResult>>>,
}

#[lamellar::am]
impl LamellarAM for ResultAm {
    async fn exec(self) {
        let mut slots = self.slots.write();
        slots[self.rank] = Some(self.result.clone());
    }
}

fn darc_error<E: std::fmt::Debug>(err: E) -> SsspError {
    SsspError::Collective(format!("could not create a darc on the world team: {err:?}"))
}

/// [`Collective`] over every PE of a lamellar world.
///
/// Creating one is itself collective: every PE must call [`LamellarComm::new`].
pub struct LamellarComm {
    world: LamellarWorld,
    winner: LocalRwDarc<Candidate>,
    setup: LocalRwDarc<Option<Setup>>,
    block: LocalRwDarc<Option<ColumnBlock>>,
    results: LocalRwDarc<Vec<Option<LocalResult>>>,
}

impl LamellarComm {
    pub fn new(world: LamellarWorld) -> Result<LamellarComm> {
        let num_pes = world.num_pes();
        let winner = LocalRwDarc::new(world.team(), Candidate::NONE).map_err(darc_error)?;
        let setup = LocalRwDarc::new(world.team(), None).map_err(darc_error)?;
        let block = LocalRwDarc::new(world.team(), None).map_err(darc_error)?;
        let results = LocalRwDarc::new(world.team(), vec![None; num_pes]).map_err(darc_error)?;
        Ok(LamellarComm {
            world,
            winner,
            setup,
            block,
            results,
        })
    }

    fn settle(&self) {
        self.world.wait_all();
        self.world.barrier();
    }
}

impl Collective for LamellarComm {
    fn rank(&self) -> usize {
        self.world.my_pe()
    }

    fn num_workers(&self) -> usize {
        self.world.num_pes()
    }

    fn barrier(&self) -> Result<()> {
        self.world.barrier();
        Ok(())
    }

    fn broadcast(&self, setup: Option<Setup>) -> Result<Setup> {
        **self.setup.write() = None;
        self.world.barrier();
        if self.is_coordinator() {
            match setup {
                Some(setup) => {
                    let _ = self.world.exec_am_all(SetupAm {
                        setup,
                        slot: self.setup.clone(),
                    });
                }
                None => warn!("coordinator has nothing to broadcast"),
            }
        }
        self.settle();
        let received: Option<Setup> = **self.setup.read();
        received.ok_or_else(|| {
            SsspError::Collective(format!("PE {} received no setup", self.rank()))
        })
    }

    fn scatter(&self, blocks: Option<Vec<ColumnBlock>>) -> Result<ColumnBlock> {
        **self.block.write() = None;
        self.world.barrier();
        if self.is_coordinator() {
            match blocks {
                Some(blocks) if blocks.len() == self.num_workers() => {
                    for (pe, block) in blocks.into_iter().enumerate() {
                        let _ = self.world.exec_am_pe(
                            pe,
                            BlockAm {
                                block,
                                slot: self.block.clone(),
                            },
                        );
                    }
                }
                Some(blocks) => warn!(
                    blocks = blocks.len(),
                    pes = self.num_workers(),
                    "block count does not match the number of PEs"
                ),
                None => warn!("coordinator has nothing to scatter"),
            }
        }
        self.settle();
        let received = std::mem::take(&mut **self.block.write());
        received.ok_or_else(|| {
            SsspError::Collective(format!("PE {} received no column block", self.rank()))
        })
    }

    fn argmin(&self, local: Candidate) -> Result<Candidate> {
        **self.winner.write() = Candidate::NONE;
        self.world.barrier();
        let _ = self.world.exec_am_all(ArgminAm {
            candidate: local,
            winner: self.winner.clone(),
        });
        self.settle();
        let winner: Candidate = **self.winner.read();
        Ok(winner)
    }

    fn gather(&self, local: LocalResult) -> Result<Option<Vec<LocalResult>>> {
        if self.is_coordinator() {
            let mut slots = self.results.write();
            slots.iter_mut().for_each(|slot| *slot = None);
        }
        self.world.barrier();
        let _ = self.world.exec_am_pe(
            COORDINATOR,
            ResultAm {
                rank: self.rank(),
                result: local,
                slots: self.results.clone(),
            },
        );
        self.settle();
        if !self.is_coordinator() {
            return Ok(None);
        }
        let fresh = vec![None; self.num_workers()];
        let slots = std::mem::replace(&mut **self.results.write(), fresh);
        slots
            .into_iter()
            .enumerate()
            .map(|(pe, slot)| {
                slot.ok_or_else(|| SsspError::Collective(format!("no result from PE {pe}")))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}
