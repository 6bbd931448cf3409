use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_SCORE_PRECISION: u32 = 4;
pub const MAX_SCORE_PRECISION: u32 = 12;

/// What to do with a transaction whose product is not in the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingProductPolicy {
    /// Abort the run with `Error::MissingReference`
    #[default]
    Reject,
    /// Drop the transaction, count it, and keep going
    Drop,
}

impl FromStr for MissingProductPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "drop" => Ok(Self::Drop),
            other => Err(Error::InvalidConfig(format!(
                "unknown missing product policy '{}' (expected reject|drop)",
                other
            ))),
        }
    }
}

impl fmt::Display for MissingProductPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => f.write_str("reject"),
            Self::Drop => f.write_str("drop"),
        }
    }
}

/// Parameters for one lookalike run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LookalikeConfig {
    /// Fixed date platform age is measured against; never the wall clock
    pub reference_date: NaiveDate,
    pub top_k: usize,
    /// Decimal places scores are rounded to
    pub score_precision: u32,
    /// Customers to compute lookalikes for, in output order
    pub target_customer_ids: Vec<String>,
    pub missing_product_policy: MissingProductPolicy,
    /// Attach per-feature contributions to every returned peer
    pub explain: bool,
}

pub fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
}

impl Default for LookalikeConfig {
    fn default() -> Self {
        Self {
            reference_date: default_reference_date(),
            top_k: DEFAULT_TOP_K,
            score_precision: DEFAULT_SCORE_PRECISION,
            target_customer_ids: Vec::new(),
            missing_product_policy: MissingProductPolicy::default(),
            explain: false,
        }
    }
}

impl LookalikeConfig {
    /// Read a config from a JSON file. Missing keys take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(Error::InvalidConfig("top_k must be at least 1".to_string()));
        }
        if self.score_precision > MAX_SCORE_PRECISION {
            return Err(Error::InvalidConfig(format!(
                "score_precision must be at most {}, got {}",
                MAX_SCORE_PRECISION, self.score_precision
            )));
        }
        Ok(())
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_customer_ids = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}
