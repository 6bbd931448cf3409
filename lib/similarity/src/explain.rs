//! Lookalike results and explainability
//!
//! Output structures for a batch: ranked peers per target, per-target
//! failures, and optional per-feature breakdowns of each peer's score.

use indexmap::IndexMap;
use lookalike_core::{dot, norm, CustomerId, Error, Vector};
use serde::ser::{SerializeTuple, Serializer};
use serde::Serialize;

/// Features reported per explanation, strongest first
pub const DEFAULT_EXPLAIN_FEATURES: usize = 5;

/// A ranked peer: serialized as `[customer_id, score]`
#[derive(Debug, Clone, PartialEq)]
pub struct Peer {
    pub customer_id: CustomerId,
    /// Cosine similarity rounded to the configured precision
    pub score: f64,
}

impl Peer {
    pub fn new(customer_id: CustomerId, score: f64) -> Self {
        Self { customer_id, score }
    }
}

impl Serialize for Peer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.customer_id)?;
        tuple.serialize_element(&self.score)?;
        tuple.end()
    }
}

/// Target id -> ranked peers, in request order
///
/// Serializes as `{"C0001": [["C0174", 0.9786], ...], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LookalikeResult {
    entries: IndexMap<CustomerId, Vec<Peer>>,
}

impl LookalikeResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: CustomerId, peers: Vec<Peer>) {
        self.entries.insert(target, peers);
    }

    pub fn get(&self, target: &str) -> Option<&[Peer]> {
        self.entries.get(target).map(Vec::as_slice)
    }

    pub fn contains(&self, target: &str) -> bool {
        self.entries.contains_key(target)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CustomerId, &[Peer])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn targets(&self) -> impl Iterator<Item = &CustomerId> {
        self.entries.keys()
    }
}

/// A target that could not be processed, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetFailure {
    pub target: String,
    pub reason: String,
}

impl TargetFailure {
    pub fn new(target: impl Into<String>, error: &Error) -> Self {
        Self {
            target: target.into(),
            reason: error.to_string(),
        }
    }
}

/// One feature's share of a peer's cosine score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureContribution {
    pub feature: String,
    pub contribution: f64,
}

/// Why a peer scored what it did
///
/// For standardized rows `a`, `b` the contribution of feature `i` is
/// `a_i * b_i / (‖a‖‖b‖)`; over all features they sum to the raw cosine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub peer: CustomerId,
    pub score: f64,
    pub contributions: Vec<FeatureContribution>,
}

/// Per-feature contributions of the cosine between `a` and `b`,
/// sorted by absolute contribution (ties by feature name), truncated to `limit`.
pub fn explain_pair(
    peer: CustomerId,
    feature_names: &[String],
    a: &Vector,
    b: &Vector,
    precision: u32,
    limit: usize,
) -> Explanation {
    let norm_a = norm(a.as_slice());
    let norm_b = norm(b.as_slice());
    let denom = norm_a * norm_b;

    if denom == 0.0 || a.dim() != b.dim() {
        return Explanation {
            peer,
            score: 0.0,
            contributions: Vec::new(),
        };
    }

    let mut contributions: Vec<FeatureContribution> = feature_names
        .iter()
        .zip(a.as_slice().iter().zip(b.as_slice()))
        .map(|(name, (x, y))| FeatureContribution {
            feature: name.clone(),
            contribution: x * y / denom,
        })
        .collect();

    contributions.sort_by(|l, r| {
        r.contribution
            .abs()
            .total_cmp(&l.contribution.abs())
            .then_with(|| l.feature.cmp(&r.feature))
    });
    contributions.truncate(limit);
    for c in &mut contributions {
        c.contribution = round_score(c.contribution, precision);
    }

    Explanation {
        peer,
        score: round_score(dot(a.as_slice(), b.as_slice()) / denom, precision),
        contributions,
    }
}

/// Round to `precision` decimal places, half away from zero; never yields -0.0
pub fn round_score(score: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let rounded = (score * factor).round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Outcome of one batch: successes, failures and optional explanations
#[derive(Debug, Clone, Default, Serialize)]
pub struct LookalikeReport {
    pub results: LookalikeResult,
    pub failures: Vec<TargetFailure>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub explanations: IndexMap<CustomerId, Vec<Explanation>>,
}

impl LookalikeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
