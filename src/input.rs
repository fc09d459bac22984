//! Text input: the vertex count followed by the matrix, row by row.
//!
//! Tokens are separated by any whitespace. An integer at or above the
//! configured infinity (1000000 by default), or the token `i` / `inf`, means
//! there is no edge.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::{Result, SsspError};
use crate::matrix::DenseMatrix;
use crate::{Weight, UNREACHABLE};

/// The "no edge" value used by existing input files.
pub const DEFAULT_INFINITY: i64 = 1_000_000;

/// Reads a matrix from `path`, or from stdin when there is none.
pub fn load(path: Option<&Path>, infinity: i64) -> Result<DenseMatrix> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "reading matrix");
            read_matrix(std::fs::File::open(path)?, infinity)
        }
        None => {
            debug!("reading matrix from stdin");
            read_matrix(std::io::stdin().lock(), infinity)
        }
    }
}

pub fn read_matrix<R: Read>(mut reader: R, infinity: i64) -> Result<DenseMatrix> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_matrix(&text, infinity)
}

pub fn parse_matrix(text: &str, infinity: i64) -> Result<DenseMatrix> {
    let mut tokens = text.split_whitespace().enumerate();

    let (vertices, expected) = match tokens.next() {
        Some((position, token)) => {
            let malformed = || SsspError::Parse {
                position,
                token: token.to_string(),
            };
            let vertices = token.parse::<usize>().map_err(|_| malformed())?;
            let expected = vertices.checked_mul(vertices).ok_or_else(malformed)?;
            (vertices, expected)
        }
        None => {
            return Err(SsspError::Truncated {
                expected: 1,
                found: 0,
            })
        }
    };

    // the header is untrusted, so the buffer grows with what is actually read
    let mut weights = Vec::new();
    for (position, token) in tokens.take(expected) {
        let index = position - 1;
        let weight = parse_weight(token, infinity).map_err(|err| match err {
            WeightError::Negative(value) => SsspError::NegativeWeight {
                row: index / vertices,
                col: index % vertices,
                value,
            },
            WeightError::Malformed => SsspError::Parse {
                position,
                token: token.to_string(),
            },
        })?;
        weights.push(weight);
    }
    if weights.len() < expected {
        return Err(SsspError::Truncated {
            expected: expected.saturating_add(1),
            found: weights.len() + 1,
        });
    }
    DenseMatrix::new(vertices, weights)
}

enum WeightError {
    Negative(i64),
    Malformed,
}

fn parse_weight(token: &str, infinity: i64) -> std::result::Result<Weight, WeightError> {
    if token == "i" || token == "inf" {
        return Ok(UNREACHABLE);
    }
    let value = token.parse::<i64>().map_err(|_| WeightError::Malformed)?;
    if value < 0 {
        Err(WeightError::Negative(value))
    } else if value >= infinity {
        Ok(UNREACHABLE)
    } else {
        Ok(value as Weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classic_format() {
        let text = "4\n\
                    0 1 1000000 4\n\
                    1000000 0 2 1000000\n\
                    1000000 1000000 0 1000000\n\
                    1000000 1000000 1000000 0\n";
        let m = parse_matrix(text, DEFAULT_INFINITY).unwrap();
        assert_eq!(m, DenseMatrix::from_edges(4, &[(0, 1, 1), (0, 3, 4), (1, 2, 2)]));
    }

    #[test]
    fn test_infinity_tokens_and_threshold() {
        let m = parse_matrix("2 0 i inf 0", DEFAULT_INFINITY).unwrap();
        assert_eq!(m.row(0), &[0, UNREACHABLE]);
        assert_eq!(m.row(1), &[UNREACHABLE, 0]);

        let m = parse_matrix("2 0 50 99 0", 99).unwrap();
        assert_eq!(m.get(0, 1), 50);
        assert_eq!(m.get(1, 0), UNREACHABLE);
    }

    #[test]
    fn test_negative_weight() {
        let err = parse_matrix("2 0 1 -3 0", DEFAULT_INFINITY).unwrap_err();
        assert!(matches!(
            err,
            SsspError::NegativeWeight {
                row: 1,
                col: 0,
                value: -3
            }
        ));
    }

    #[test]
    fn test_malformed_and_truncated() {
        assert!(matches!(
            parse_matrix("two 0 0 0 0", DEFAULT_INFINITY),
            Err(SsspError::Parse { position: 0, .. })
        ));
        assert!(matches!(
            parse_matrix("2 0 x 0 0", DEFAULT_INFINITY),
            Err(SsspError::Parse { position: 2, .. })
        ));
        assert!(matches!(
            parse_matrix("2 0 1 1", DEFAULT_INFINITY),
            Err(SsspError::Truncated {
                expected: 5,
                found: 4
            })
        ));
        assert!(matches!(
            parse_matrix("   ", DEFAULT_INFINITY),
            Err(SsspError::Truncated { .. })
        ));
    }

    #[test]
    fn test_oversized_header() {
        let huge = format!("{} 0", u64::MAX);
        assert!(matches!(
            parse_matrix(&huge, DEFAULT_INFINITY),
            Err(SsspError::Parse { position: 0, .. })
        ));
        let square_overflows = format!("{} 0", 1usize << (usize::BITS / 2));
        assert!(matches!(
            parse_matrix(&square_overflows, DEFAULT_INFINITY),
            Err(SsspError::Parse { position: 0, .. })
        ));
        assert!(matches!(
            parse_matrix("1000000 0 1 2", DEFAULT_INFINITY),
            Err(SsspError::Truncated {
                expected: 1_000_000_000_001,
                found: 4
            })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.txt");
        std::fs::write(&path, "1\n0\n").unwrap();
        let m = load(Some(&path), DEFAULT_INFINITY).unwrap();
        assert_eq!(m.vertices(), 1);
    }
}
