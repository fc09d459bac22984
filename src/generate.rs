use rand::prelude::*;

use crate::matrix::DenseMatrix;
use crate::Weight;

/// Parameters of a random dense graph.
#[derive(Clone, Copy, Debug)]
pub struct RandomGraph {
    pub vertices: usize,
    /// Chance that any given off-diagonal edge exists.
    pub edge_probability: f64,
    /// Edge weights are drawn uniformly from `1..=max_weight`.
    pub max_weight: Weight,
    pub seed: u64,
}

impl RandomGraph {
    /// The same seed always produces the same matrix. A probability outside
    /// `[0, 1]` is clamped into it, and NaN means no edges.
    pub fn build(&self) -> DenseMatrix {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let probability = if self.edge_probability.is_nan() {
            0.0
        } else {
            self.edge_probability.clamp(0.0, 1.0)
        };
        let max_weight = self.max_weight.max(1);
        let mut edges = Vec::new();
        for from in 0..self.vertices {
            for to in 0..self.vertices {
                if from != to && rng.gen_bool(probability) {
                    edges.push((from, to, rng.gen_range(1..=max_weight)));
                }
            }
        }
        DenseMatrix::from_edges(self.vertices, &edges)
    }
}
