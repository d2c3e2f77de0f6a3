//! Dynamic Time Warping
//!
//! Aligns a reference sequence (length R) with an attempt (length A) that
//! may be faster, slower or unevenly paced.
//!
//! Recurrence over the cumulative cost matrix:
//! - D[0][0] = c(0, 0)
//! - D[i][0] = c(i, 0) + D[i-1][0]
//! - D[0][j] = c(0, j) + D[0][j-1]
//! - D[i][j] = c(i, j) + min(D[i-1][j-1], D[i-1][j], D[i][j-1])
//!
//! where c is the Euclidean distance between encoded frames. The full matrix
//! is kept because the path feeds per-frame feedback. Time and memory are
//! O(R*A); callers bound R and A through `max_frames`.
//!
//! Backtracking breaks ties diagonal first, then up (i-1), then left (j-1),
//! so identical inputs always produce the identical path.

use serde::{Deserialize, Serialize};

use crate::types::{AlignmentPath, EncodedSequence, FeatureVector};

// ============================================================================
// Alignment
// ============================================================================

/// DTW output
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    /// Cumulative cost D[R-1][A-1]
    pub distance: f64,
    /// Monotonic correspondence from (0, 0) to (R-1, A-1)
    pub path: AlignmentPath,
    /// Euclidean distance of each pair in `path`
    pub pair_costs: Vec<f64>,
}

impl Alignment {
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Mean per-pair cost; 0 for an empty path
    pub fn mean_cost(&self) -> f64 {
        if self.path.is_empty() {
            0.0
        } else {
            self.distance / self.path.len() as f64
        }
    }
}

#[inline]
pub fn euclidean_distance(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

// ============================================================================
// Cost Matrix
// ============================================================================

/// Row-major R x A matrix
struct CostMatrix {
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.cols + j] = value;
    }
}

/// Align two encoded sequences.
///
/// Either side empty yields an empty path with distance 0; the scorer turns
/// that into a "not comparable" result.
pub fn align(reference: &EncodedSequence, attempt: &EncodedSequence) -> Alignment {
    let rows = reference.len();
    let cols = attempt.len();
    if rows == 0 || cols == 0 {
        return Alignment::default();
    }

    let mut cost = CostMatrix::new(rows, cols);
    let mut acc = CostMatrix::new(rows, cols);

    for i in 0..rows {
        for j in 0..cols {
            let c = euclidean_distance(&reference.frames[i], &attempt.frames[j]);
            cost.set(i, j, c);

            let best_prev = match (i, j) {
                (0, 0) => 0.0,
                (0, _) => acc.get(0, j - 1),
                (_, 0) => acc.get(i - 1, 0),
                _ => acc
                    .get(i - 1, j - 1)
                    .min(acc.get(i - 1, j))
                    .min(acc.get(i, j - 1)),
            };
            acc.set(i, j, c + best_prev);
        }
    }

    let path = backtrack(&acc, rows, cols);
    let pair_costs = path.iter().map(|&(i, j)| cost.get(i, j)).collect();

    Alignment {
        distance: acc.get(rows - 1, cols - 1),
        path,
        pair_costs,
    }
}

fn backtrack(acc: &CostMatrix, rows: usize, cols: usize) -> AlignmentPath {
    let mut path = Vec::with_capacity(rows + cols - 1);
    let (mut i, mut j) = (rows - 1, cols - 1);
    path.push((i, j));

    while i > 0 || j > 0 {
        if i == 0 {
            j -= 1;
        } else if j == 0 {
            i -= 1;
        } else {
            let diag = acc.get(i - 1, j - 1);
            let up = acc.get(i - 1, j);
            let left = acc.get(i, j - 1);

            if diag <= up && diag <= left {
                i -= 1;
                j -= 1;
            } else if up <= left {
                i -= 1;
            } else {
                j -= 1;
            }
        }
        path.push((i, j));
    }

    path.reverse();
    path
}

// ============================================================================
// Tests
// ============================================================================
