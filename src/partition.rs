use std::ops::Range;

use crate::error::{Result, SsspError};
use crate::matrix::{ColumnBlock, DenseMatrix};

/// Block-column layout of `vertices` vertices over `workers` workers.
///
/// Worker `k` owns the contiguous vertex range `[k * b, (k + 1) * b)` with
/// `b = vertices / workers`. [`Partition::owner_of`] is the only place that
/// decides ownership; the partitioner, the engine and the collector all go
/// through it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    vertices: usize,
    workers: usize,
    block_width: usize,
}

impl Partition {
    pub fn new(vertices: usize, workers: usize) -> Result<Partition> {
        if vertices == 0 {
            return Err(SsspError::ZeroVertices);
        }
        if workers == 0 {
            return Err(SsspError::ZeroWorkers);
        }
        if vertices % workers != 0 {
            return Err(SsspError::Indivisible { vertices, workers });
        }
        Ok(Partition {
            vertices,
            workers,
            block_width: vertices / workers,
        })
    }

    pub fn vertices(&self) -> usize {
        self.vertices
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of vertices (and matrix columns) each worker owns.
    pub fn block_width(&self) -> usize {
        self.block_width
    }

    /// The worker that owns `vertex`.
    pub fn owner_of(&self, vertex: usize) -> usize {
        vertex / self.block_width
    }

    /// Position of `vertex` inside its owner's block.
    pub fn local_index(&self, vertex: usize) -> usize {
        vertex % self.block_width
    }

    pub fn global_index(&self, worker: usize, local: usize) -> usize {
        worker * self.block_width + local
    }

    pub fn owned_range(&self, worker: usize) -> Range<usize> {
        let first = worker * self.block_width;
        first..first + self.block_width
    }

    /// Cuts `matrix` into one column block per worker, in rank order.
    pub fn split(&self, matrix: &DenseMatrix) -> Result<Vec<ColumnBlock>> {
        if matrix.vertices() != self.vertices {
            return Err(SsspError::NotSquare {
                expected: self.vertices * self.vertices,
                found: matrix.vertices() * matrix.vertices(),
            });
        }
        Ok((0..self.workers)
            .map(|worker| {
                ColumnBlock::cut(matrix, self.owned_range(worker).start, self.block_width)
            })
            .collect())
    }
}
