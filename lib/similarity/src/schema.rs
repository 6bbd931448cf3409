//! Feature schema
//!
//! The fixed column layout every customer vector is built against.
//! Region and category vocabularies are collected once from the full
//! dataset, so all vectors share the same width and axis order.

use lookalike_core::Dataset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Numeric columns, in vector order, ahead of the indicator blocks
pub const NUMERIC_COLUMNS: [&str; 6] = [
    "days_on_platform",
    "num_transactions",
    "total_quantity",
    "avg_quantity",
    "total_spend",
    "avg_spend",
];

pub const REGION_PREFIX: &str = "region_";
pub const CATEGORY_PREFIX: &str = "category_";

/// Column vocabulary for one run
///
/// Layout: `NUMERIC_COLUMNS`, then one `region_<R>` column per region, then
/// one `category_<C>` column per catalog category. Both vocabularies are
/// sorted, so the layout depends only on the set of values observed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeatureSchema {
    pub regions: Vec<String>,
    pub categories: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema from explicit vocabularies (sorted and deduplicated here)
    pub fn new<R, C>(regions: R, categories: C) -> Self
    where
        R: IntoIterator<Item = String>,
        C: IntoIterator<Item = String>,
    {
        let regions: BTreeSet<String> = regions.into_iter().collect();
        let categories: BTreeSet<String> = categories.into_iter().collect();
        Self {
            regions: regions.into_iter().collect(),
            categories: categories.into_iter().collect(),
        }
    }

    /// First pass: regions from the customer set, categories from the full product catalog
    pub fn discover(dataset: &Dataset) -> Self {
        Self::new(
            dataset.customers.iter().map(|c| c.region.clone()),
            dataset.products.iter().map(|p| p.category.clone()),
        )
    }

    pub fn dim(&self) -> usize {
        NUMERIC_COLUMNS.len() + self.regions.len() + self.categories.len()
    }

    pub fn region_offset(&self) -> usize {
        NUMERIC_COLUMNS.len()
    }

    pub fn category_offset(&self) -> usize {
        NUMERIC_COLUMNS.len() + self.regions.len()
    }

    pub fn region_index(&self, region: &str) -> Option<usize> {
        self.regions
            .binary_search_by(|r| r.as_str().cmp(region))
            .ok()
            .map(|i| self.region_offset() + i)
    }

    pub fn category_index(&self, category: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(category))
            .ok()
            .map(|i| self.category_offset() + i)
    }

    /// Column names in vector order
    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.dim());
        names.extend(NUMERIC_COLUMNS.iter().map(|c| c.to_string()));
        names.extend(self.regions.iter().map(|r| format!("{}{}", REGION_PREFIX, r)));
        names.extend(self.categories.iter().map(|c| format!("{}{}", CATEGORY_PREFIX, c)));
        names
    }
}
