use serde::{Deserialize, Serialize};

use crate::error::{Result, SsspError};
use crate::{Weight, UNREACHABLE};

/// The full `n x n` weight matrix, stored row-major.
///
/// `get(i, j)` is the weight of the edge `i -> j`, or [`UNREACHABLE`].
/// Only the coordinator ever holds one of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenseMatrix {
    vertices: usize,
    weights: Vec<Weight>,
}

impl DenseMatrix {
    /// Wraps a row-major buffer of `vertices * vertices` weights.
    pub fn new(vertices: usize, weights: Vec<Weight>) -> Result<DenseMatrix> {
        let cells = vertices.checked_mul(vertices);
        if cells != Some(weights.len()) {
            return Err(SsspError::NotSquare {
                expected: cells.unwrap_or(usize::MAX),
                found: weights.len(),
            });
        }
        Ok(DenseMatrix { vertices, weights })
    }

    /// A matrix with zero self-loops, the given edges, and nothing else.
    ///
    /// Later duplicates of an edge overwrite earlier ones.
    pub fn from_edges(vertices: usize, edges: &[(usize, usize, Weight)]) -> DenseMatrix {
        let mut weights = vec![UNREACHABLE; vertices * vertices];
        for v in 0..vertices {
            weights[v * vertices + v] = 0;
        }
        for &(from, to, weight) in edges {
            weights[from * vertices + to] = weight;
        }
        DenseMatrix { vertices, weights }
    }

    pub fn vertices(&self) -> usize {
        self.vertices
    }

    pub fn get(&self, row: usize, col: usize) -> Weight {
        self.weights[row * self.vertices + col]
    }

    pub fn row(&self, row: usize) -> &[Weight] {
        &self.weights[row * self.vertices..(row + 1) * self.vertices]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Weight]> {
        // chunks(0) panics, and an empty matrix has no rows anyway
        self.weights.chunks(self.vertices.max(1))
    }

    /// Checks the preconditions the relaxation loop relies on.
    ///
    /// Weights are unsigned, so negativity is caught by the loader; what is left
    /// to check here is a non-empty matrix with a zero-cost self-loop on every
    /// vertex.
    pub fn validate(&self) -> Result<()> {
        if self.vertices == 0 {
            return Err(SsspError::ZeroVertices);
        }
        for v in 0..self.vertices {
            let weight = self.get(v, v);
            if weight != 0 {
                return Err(SsspError::MissingSelfLoop { vertex: v, weight });
            }
        }
        Ok(())
    }
}

/// One worker's share of the matrix: every row, restricted to a contiguous
/// range of columns.
///
/// Stored row-major with a stride of `width`, so `data[row * width + local_col]`
/// is `W[row][offset + local_col]`. Rows are never split, which is what lets a
/// worker relax its own vertices against any settled vertex without asking
/// anyone else for weights.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnBlock {
    rows: usize,
    width: usize,
    offset: usize,
    data: Vec<Weight>,
}

impl ColumnBlock {
    /// Copies columns `[offset, offset + width)` out of `matrix`.
    pub fn cut(matrix: &DenseMatrix, offset: usize, width: usize) -> ColumnBlock {
        let rows = matrix.vertices();
        let mut data = Vec::with_capacity(rows * width);
        for row in matrix.rows() {
            data.extend_from_slice(&row[offset..offset + width]);
        }
        ColumnBlock {
            rows,
            width,
            offset,
            data,
        }
    }

    /// Number of rows, i.e. the global vertex count.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of owned columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Global id of local column 0.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Weight of the edge `row -> offset + local_col`.
    pub fn get(&self, row: usize, local_col: usize) -> Weight {
        self.data[row * self.width + local_col]
    }

    /// Outgoing weights of `row`, restricted to the owned columns.
    pub fn row(&self, row: usize) -> &[Weight] {
        &self.data[row * self.width..(row + 1) * self.width]
    }

    pub fn as_slice(&self) -> &[Weight] {
        &self.data
    }
}
