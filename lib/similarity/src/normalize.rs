//! Normalizer
//!
//! Per-column standardization to zero mean and unit variance, with the
//! parameters fitted on the customer population of the current run.

use lookalike_core::{Error, Result, Vector};
use serde::Serialize;
use tracing::warn;

/// Standard deviations at or below this are treated as zero variance.
/// A column whose values are all equal is always zero variance.
pub const DEGENERATE_STD_EPSILON: f64 = 1e-12;

/// Fitted statistics of one feature column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub mean: f64,
    /// Population standard deviation (divisor `n`)
    pub std_dev: f64,
    /// Zero-variance column; every standardized value is 0
    pub degenerate: bool,
}

/// Column-wise standard scaler
#[derive(Debug, Clone)]
pub struct Normalizer {
    columns: Vec<ColumnStats>,
}

impl Normalizer {
    /// Fit mean and population standard deviation for every column.
    ///
    /// `names` labels the columns and fixes the expected width.
    pub fn fit(names: &[String], rows: &[Vector]) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::EmptyInput);
        }
        let dim = names.len();
        for row in rows {
            if row.dim() != dim {
                return Err(Error::InvalidDimension {
                    expected: dim,
                    actual: row.dim(),
                });
            }
        }

        let n = rows.len() as f64;
        let mut means = vec![0.0; dim];
        let mut constant = vec![true; dim];
        let first = rows[0].as_slice();
        for row in rows {
            for (j, v) in row.as_slice().iter().enumerate() {
                means[j] += v;
                if *v != first[j] {
                    constant[j] = false;
                }
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut variances = vec![0.0; dim];
        for row in rows {
            for ((var, v), m) in variances.iter_mut().zip(row.as_slice()).zip(&means) {
                let d = v - m;
                *var += d * d;
            }
        }

        let columns = names
            .iter()
            .zip(means)
            .zip(variances)
            .zip(constant)
            .map(|(((name, mean), var), constant)| {
                let std_dev = if constant { 0.0 } else { (var / n).sqrt() };
                let degenerate = std_dev <= DEGENERATE_STD_EPSILON;
                if degenerate {
                    warn!(column = %name, "Degenerate column: zero variance, standardized to 0");
                }
                ColumnStats {
                    name: name.clone(),
                    mean,
                    std_dev,
                    degenerate,
                }
            })
            .collect();

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[ColumnStats] {
        &self.columns
    }

    pub fn dim(&self) -> usize {
        self.columns.len()
    }

    pub fn degenerate_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.degenerate)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Standardize one row: `(x - mean) / std`, or 0 for degenerate columns
    pub fn transform(&self, row: &Vector) -> Result<Vector> {
        if row.dim() != self.dim() {
            return Err(Error::InvalidDimension {
                expected: self.dim(),
                actual: row.dim(),
            });
        }
        let data = row
            .as_slice()
            .iter()
            .zip(&self.columns)
            .map(|(v, stats)| {
                if stats.degenerate {
                    0.0
                } else {
                    (v - stats.mean) / stats.std_dev
                }
            })
            .collect();
        Ok(Vector::new(data))
    }

    pub fn transform_all(&self, rows: &[Vector]) -> Result<Vec<Vector>> {
        rows.iter().map(|row| self.transform(row)).collect()
    }

    /// Fit on `rows` and standardize them in one step
    pub fn fit_transform(names: &[String], rows: &[Vector]) -> Result<(Self, Vec<Vector>)> {
        let normalizer = Self::fit(names, rows)?;
        let scaled = normalizer.transform_all(rows)?;
        Ok((normalizer, scaled))
    }
}
