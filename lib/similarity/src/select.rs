//! Lookalike Selector
//!
//! Extracts the top-K peers of each requested target from a similarity
//! matrix. Ranking uses the composite key (descending raw score, ascending
//! customer id), so ties never depend on sort stability. Scores are rounded
//! only after the top K have been chosen.

use crate::explain::{round_score, LookalikeReport, Peer, TargetFailure};
use crate::matrix::SimilarityMatrix;
use ahash::{AHashMap, AHashSet};
use lookalike_core::{CustomerId, Error, LookalikeConfig, Result, DEFAULT_SCORE_PRECISION, DEFAULT_TOP_K};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Top-K peer selection over a [`SimilarityMatrix`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookalikeSelector {
    top_k: usize,
    precision: u32,
}

impl Default for LookalikeSelector {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            precision: DEFAULT_SCORE_PRECISION,
        }
    }
}

impl LookalikeSelector {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            ..Default::default()
        }
    }

    pub fn from_config(config: &LookalikeConfig) -> Self {
        Self {
            top_k: config.top_k,
            precision: config.score_precision,
        }
    }

    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Ranked peers for the customer at row `target` (never includes `target`)
    pub fn select_row(&self, matrix: &SimilarityMatrix, ids: &[CustomerId], target: usize) -> Vec<Peer> {
        let mut candidates: Vec<(f64, &CustomerId)> = matrix
            .row(target)
            .iter()
            .zip(ids)
            .enumerate()
            .filter(|(j, _)| *j != target)
            .map(|(_, (score, id))| (*score, id))
            .collect();

        if candidates.len() > self.top_k && self.top_k > 0 {
            candidates.select_nth_unstable_by(self.top_k - 1, rank);
            candidates.truncate(self.top_k);
        }
        candidates.sort_unstable_by(rank);
        candidates.truncate(self.top_k);

        candidates
            .into_iter()
            .map(|(score, id)| Peer::new(id.clone(), round_score(score, self.precision)))
            .collect()
    }

    /// Process every target in request order.
    ///
    /// Unknown targets become [`TargetFailure`]s and do not stop the batch;
    /// a repeated target is processed once.
    pub fn select<S: AsRef<str>>(
        &self,
        matrix: &SimilarityMatrix,
        ids: &[CustomerId],
        targets: &[S],
    ) -> Result<LookalikeReport> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be at least 1".to_string()));
        }
        if matrix.len() != ids.len() {
            return Err(Error::InvalidDimension {
                expected: ids.len(),
                actual: matrix.len(),
            });
        }

        let index: AHashMap<&str, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut report = LookalikeReport::default();
        let mut seen: AHashSet<&str> = AHashSet::with_capacity(targets.len());

        for target in targets {
            let target = target.as_ref();
            if !seen.insert(target) {
                debug!(customer = target, "Skipping repeated target");
                continue;
            }

            match index.get(target) {
                Some(&row) => {
                    let peers = self.select_row(matrix, ids, row);
                    report.results.insert(ids[row].clone(), peers);
                }
                None => {
                    let err = Error::UnknownCustomer(target.to_string());
                    warn!(customer = target, "{}", err);
                    report.failures.push(TargetFailure::new(target, &err));
                }
            }
        }

        Ok(report)
    }
}

/// Descending score, then ascending customer id
fn rank(a: &(f64, &CustomerId), b: &(f64, &CustomerId)) -> Ordering {
    OrderedFloat(b.0)
        .cmp(&OrderedFloat(a.0))
        .then_with(|| a.1.cmp(b.1))
}
