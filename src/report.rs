//! Gathered results and how they are printed.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::collective::LocalResult;
use crate::error::{Result, SsspError};
use crate::matrix::DenseMatrix;
use crate::partition::Partition;
use crate::{Weight, SOURCE, UNREACHABLE};

/// Full-length distance and predecessor arrays, indexed by global vertex id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortestPaths {
    dist: Vec<Weight>,
    pred: Vec<Option<usize>>,
}

impl ShortestPaths {
    pub fn new(dist: Vec<Weight>, pred: Vec<Option<usize>>) -> Result<ShortestPaths> {
        if dist.len() != pred.len() {
            return Err(SsspError::ResultShape {
                expected: dist.len(),
                found: pred.len(),
            });
        }
        Ok(ShortestPaths { dist, pred })
    }

    /// Concatenates per-worker results gathered in rank order.
    pub fn from_parts(partition: &Partition, parts: Vec<LocalResult>) -> Result<ShortestPaths> {
        let found = parts.iter().map(|part| part.dist.len()).sum::<usize>();
        let misplaced = parts.len() != partition.workers()
            || parts.iter().enumerate().any(|(rank, part)| {
                part.offset != partition.owned_range(rank).start
                    || part.dist.len() != partition.block_width()
                    || part.pred.len() != partition.block_width()
            });
        if misplaced {
            return Err(SsspError::ResultShape {
                expected: partition.vertices(),
                found,
            });
        }
        let mut dist = Vec::with_capacity(partition.vertices());
        let mut pred = Vec::with_capacity(partition.vertices());
        for part in parts {
            dist.extend(part.dist);
            pred.extend(part.pred);
        }
        Ok(ShortestPaths { dist, pred })
    }

    pub fn vertices(&self) -> usize {
        self.dist.len()
    }

    pub fn dist(&self) -> &[Weight] {
        &self.dist
    }

    pub fn pred(&self) -> &[Option<usize>] {
        &self.pred
    }

    pub fn is_reachable(&self, vertex: usize) -> bool {
        self.dist[vertex] != UNREACHABLE
    }

    /// The path `0 -> ... -> vertex`, following predecessors backwards.
    ///
    /// `None` for unreachable vertices, and for a predecessor chain that does
    /// not get back to the source within `n - 1` steps.
    pub fn path_to(&self, vertex: usize) -> Option<Vec<usize>> {
        if !self.is_reachable(vertex) {
            return None;
        }
        let mut path = vec![vertex];
        let mut current = vertex;
        while current != SOURCE {
            if path.len() > self.vertices() {
                return None;
            }
            current = self.pred[current]?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }

    /// Distance table, one line per vertex other than the source.
    pub fn write_dists<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "  v    dist 0->v")?;
        writeln!(out, "----   ---------")?;
        for (v, &dist) in self.dist.iter().enumerate().skip(1) {
            if dist == UNREACHABLE {
                writeln!(out, "{v:3}       {:>5}", "inf")?;
            } else {
                writeln!(out, "{v:3}       {dist:4}")?;
            }
        }
        writeln!(out)
    }

    /// Path table, one line per vertex other than the source.
    pub fn write_paths<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "  v     Path 0->v")?;
        writeln!(out, "----    ---------")?;
        for v in 1..self.vertices() {
            write!(out, "{v:3}:    ")?;
            match self.path_to(v) {
                Some(path) => {
                    for vertex in path {
                        write!(out, "{vertex} ")?;
                    }
                    writeln!(out)?;
                }
                None => writeln!(out, "unreachable")?,
            }
        }
        Ok(())
    }

    /// Writes `{"dist": [...], "pred": [...], "paths": [...]}` to `path`.
    ///
    /// Unreachable vertices get `null` for all three.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(file, &self.to_json())
            .map_err(|err| SsspError::Io(err.into()))?;
        Ok(())
    }

    fn to_json(&self) -> JsonPaths {
        JsonPaths {
            dist: self
                .dist
                .iter()
                .map(|&dist| (dist != UNREACHABLE).then_some(dist))
                .collect(),
            pred: self
                .pred
                .iter()
                .zip(&self.dist)
                .map(|(&pred, &dist)| pred.filter(|_| dist != UNREACHABLE))
                .collect(),
            paths: (0..self.vertices()).map(|v| self.path_to(v)).collect(),
        }
    }
}

#[derive(Serialize)]
struct JsonPaths {
    dist: Vec<Option<Weight>>,
    pred: Vec<Option<usize>>,
    paths: Vec<Option<Vec<usize>>>,
}

/// One row per line, `i` for a missing edge.
pub fn write_matrix<W: Write>(matrix: &DenseMatrix, out: &mut W) -> std::io::Result<()> {
    for row in matrix.rows() {
        for &weight in row {
            if weight == UNREACHABLE {
                write!(out, "i ")?;
            } else {
                write!(out, "{weight} ")?;
            }
        }
        writeln!(out)?;
    }
    writeln!(out)
}
