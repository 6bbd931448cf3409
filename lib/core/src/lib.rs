//! # Lookalike Core
//!
//! Core types shared by every stage of the lookalike engine.
//!
//! - [`Customer`], [`Transaction`], [`Product`] - the raw records one run consumes
//! - [`Dataset`] - the three record sets bundled together
//! - [`CustomerId`] - customer identity, the key results are reported by
//! - [`Vector`] - dense `f64` feature vector with dot/norm/cosine
//! - [`LookalikeConfig`] - run parameters (reference date, top-K, precision, targets)
//! - [`Error`] - the error taxonomy
//!
//! ## Example
//!
//! ```rust
//! use lookalike_core::{Vector, LookalikeConfig};
//!
//! let a = Vector::new(vec![1.0, 0.0, 1.0]);
//! let b = Vector::new(vec![1.0, 0.0, 0.0]);
//! assert!(a.cosine_similarity(&b) > 0.7);
//!
//! let config = LookalikeConfig::default().with_targets(["C0001", "C0002"]);
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod error;
pub mod record;
pub mod vector;

pub use config::{LookalikeConfig, MissingProductPolicy, DEFAULT_SCORE_PRECISION, DEFAULT_TOP_K};
pub use error::{Error, Result};
pub use record::{Customer, CustomerId, Dataset, Product, Transaction};
pub use vector::{cosine_similarity, dot, norm, Vector};
