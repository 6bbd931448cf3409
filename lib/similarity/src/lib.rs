//! # Lookalike Similarity
//!
//! The similarity pipeline that turns raw commerce records into a ranked
//! list of lookalike customers.
//!
//! ## Stages
//!
//! - **Feature Builder**: joins customers, transactions and products into
//!   one fixed-width vector per customer ([`FeatureBuilder`], [`FeatureSchema`])
//! - **Normalizer**: per-column standardization ([`Normalizer`])
//! - **Similarity Engine**: full pairwise cosine similarity ([`SimilarityMatrix`])
//! - **Lookalike Selector**: deterministic top-K per target ([`LookalikeSelector`])
//!
//! ## Example
//!
//! ```rust
//! use lookalike_similarity::generate_lookalikes;
//! use lookalike_core::{Customer, Dataset, Product, Transaction};
//! use chrono::NaiveDate;
//!
//! let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let dataset = Dataset::new(
//!     vec![
//!         Customer::new("C0001", "Asia", day),
//!         Customer::new("C0002", "Asia", day),
//!         Customer::new("C0003", "Europe", day),
//!     ],
//!     vec![
//!         Transaction::new("T1", "C0001", "P1", 2.0, 200.0, day),
//!         Transaction::new("T2", "C0002", "P1", 2.0, 210.0, day),
//!     ],
//!     vec![Product::new("P1", "Books")],
//! );
//!
//! let report = generate_lookalikes(&dataset, &["C0001"], 2).unwrap();
//! let peers = report.results.get("C0001").unwrap();
//! assert_eq!(peers[0].customer_id.as_str(), "C0002");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Features   │────>│  Normalize  │────>│   Matrix    │────>│   Select    │
//! │ (records→v) │     │  (z-score)  │     │  (cosine)   │     │   (top-K)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                                                                    │
//!                                                             ┌─────────────┐
//!                                                             │  Explain    │
//!                                                             │  (results)  │
//!                                                             └─────────────┘
//! ```

pub mod schema;
pub mod features;
pub mod normalize;
pub mod matrix;
pub mod select;
pub mod explain;
pub mod pipeline;

// Re-export main types for convenience
pub use schema::{FeatureSchema, NUMERIC_COLUMNS};
pub use features::{BuildReport, CustomerFeatures, FeatureBuilder, FeatureTable};
pub use normalize::{ColumnStats, Normalizer};
pub use matrix::SimilarityMatrix;
pub use select::LookalikeSelector;
pub use explain::{
    explain_pair, round_score, Explanation, FeatureContribution, LookalikeReport, LookalikeResult, Peer,
    TargetFailure,
};
pub use pipeline::{generate_lookalikes, LookalikePipeline, PipelineOutput};
