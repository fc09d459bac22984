//! Serial single-source shortest paths, used to check distributed runs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{Result, SsspError};
use crate::matrix::DenseMatrix;
use crate::report::ShortestPaths;
use crate::{Weight, SOURCE, UNREACHABLE};

#[derive(Debug, PartialEq, Eq)]
struct State {
    vertex: usize,
    cost: Weight,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Binary-heap Dijkstra from vertex 0 over the whole matrix.
pub fn dijkstra(matrix: &DenseMatrix) -> Vec<Weight> {
    let n = matrix.vertices();
    let mut dist = vec![UNREACHABLE; n];
    if n == 0 {
        return dist;
    }
    let mut heap = BinaryHeap::new();

    dist[SOURCE] = 0;
    heap.push(State {
        vertex: SOURCE,
        cost: 0,
    });

    while let Some(State { vertex, cost }) = heap.pop() {
        if cost > dist[vertex] {
            continue;
        }
        for (target, &weight) in matrix.row(vertex).iter().enumerate() {
            if weight == UNREACHABLE {
                continue;
            }
            let next = State {
                vertex: target,
                cost: cost.saturating_add(weight),
            };
            if next.cost < dist[target] {
                dist[target] = next.cost;
                heap.push(next);
            }
        }
    }

    dist
}

/// Checks distances against [`dijkstra`] and that every reachable vertex has a
/// predecessor chain whose edge weights add up to its distance.
pub fn verify(matrix: &DenseMatrix, paths: &ShortestPaths) -> Result<()> {
    let expected = dijkstra(matrix);
    for (vertex, (&expected, &found)) in expected.iter().zip(paths.dist()).enumerate() {
        if expected != found {
            return Err(SsspError::VerificationFailed {
                vertex,
                expected,
                found,
            });
        }
        if found == UNREACHABLE {
            continue;
        }
        let length = paths.path_to(vertex).map(|path| {
            path.windows(2)
                .map(|hop| matrix.get(hop[0], hop[1]))
                .fold(0 as Weight, Weight::saturating_add)
        });
        if length != Some(found) {
            return Err(SsspError::VerificationFailed {
                vertex,
                expected: found,
                found: length.unwrap_or(UNREACHABLE),
            });
        }
    }
    Ok(())
}
