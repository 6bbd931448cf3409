//! Similarity Engine
//!
//! Full pairwise cosine similarity over the standardized feature rows.
//! O(n² · d); each unordered pair is scored once and mirrored.

use lookalike_core::{dot, norm, Error, Result, Vector};
use rayon::prelude::*;

/// Dense, symmetric `n × n` cosine similarity matrix
///
/// Indexed by the same customer ordering as the rows it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SimilarityMatrix {
    /// Score every pair of rows.
    ///
    /// Rows are processed in parallel; each row only reads the shared input,
    /// so the result is the same as a sequential pass.
    pub fn compute(rows: &[Vector]) -> Result<Self> {
        let n = rows.len();
        if let Some(first) = rows.first() {
            let dim = first.dim();
            if let Some(bad) = rows.iter().find(|r| r.dim() != dim) {
                return Err(Error::InvalidDimension {
                    expected: dim,
                    actual: bad.dim(),
                });
            }
        }

        let norms: Vec<f64> = rows.iter().map(|r| norm(r.as_slice())).collect();

        // Upper triangle, row i holds columns i..n
        let upper: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                (i..n)
                    .map(|j| pair_score(&rows[i], &rows[j], norms[i], norms[j]))
                    .collect()
            })
            .collect();

        let mut data = vec![0.0; n * n];
        for (i, row) in upper.into_iter().enumerate() {
            for (offset, score) in row.into_iter().enumerate() {
                let j = i + offset;
                data[i * n + j] = score;
                data[j * n + i] = score;
            }
        }

        Ok(Self { n, data })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }
}

/// Cosine with precomputed norms, 0 for zero-norm sides, clamped to [-1, 1]
#[inline]
fn pair_score(a: &Vector, b: &Vector, norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot(a.as_slice(), b.as_slice()) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
