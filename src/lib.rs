//! # lookalike
//!
//! Ranks, for each target customer in a commerce dataset, the most similar
//! other customers ("lookalikes") from a joint representation of
//! demographics and aggregated transaction behavior.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! lookalike --data-dir ./data --first 20 --top-k 3 --output Lookalike.json
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use lookalike::prelude::*;
//!
//! let dataset = CsvLoader::new("./data").load().unwrap();
//! let config = LookalikeConfig::default().with_targets(["C0001", "C0002"]);
//! let output = LookalikePipeline::new(config).unwrap().run(&dataset).unwrap();
//!
//! for (target, peers) in output.report.results.iter() {
//!     println!("{}: {:?}", target, peers);
//! }
//! ResultWriter::new("Lookalike.json").write_result(&output.report.results).unwrap();
//! ```
//!
//! ## Crate Structure
//!
//! - `lookalike-core` - records, dense vectors, configuration, errors
//! - `lookalike-similarity` - feature building, standardization, cosine matrix, top-K selection
//! - `lookalike-storage` - CSV loading and atomic JSON output
//!
//! ## Pipeline
//!
//! - **Features**: platform age, transaction counts, quantity and spend
//!   totals/averages, one-hot region, per-category purchase indicators
//! - **Standardization**: zero mean, unit variance per column
//! - **Similarity**: full pairwise cosine
//! - **Selection**: top-K per target, ties broken by customer id

// Re-export core types
pub use lookalike_core::{
    Customer, CustomerId, Dataset, Product, Transaction,
    Vector, LookalikeConfig, MissingProductPolicy,
    Error, Result,
};

// Re-export the similarity pipeline
pub use lookalike_similarity::{
    FeatureSchema, FeatureBuilder, FeatureTable, CustomerFeatures, BuildReport,
    Normalizer, ColumnStats, SimilarityMatrix, LookalikeSelector,
    LookalikeReport, LookalikeResult, Peer, TargetFailure, Explanation,
    LookalikePipeline, PipelineOutput, generate_lookalikes,
};

// Re-export storage
pub use lookalike_storage::{CsvLoader, ResultWriter, write_schema};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Customer, CustomerId, Dataset, Product, Transaction,
        LookalikeConfig, MissingProductPolicy,
        Error, Result,
        FeatureSchema, LookalikePipeline, PipelineOutput, LookalikeReport, LookalikeResult, Peer,
        generate_lookalikes,
        CsvLoader, ResultWriter,
    };
}
