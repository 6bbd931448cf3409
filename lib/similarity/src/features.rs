//! Feature Builder
//!
//! Joins customers, transactions and products into one fixed-width feature
//! vector per customer. Works in two passes: the [`FeatureSchema`] vocabulary
//! is collected first, then every customer row is laid out against it.

use crate::schema::FeatureSchema;
use ahash::AHashMap;
use chrono::NaiveDate;
use lookalike_core::{
    CustomerId, Dataset, Error, LookalikeConfig, MissingProductPolicy, Result, Vector,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Aggregated features of a single customer, before vectorization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerFeatures {
    pub customer_id: CustomerId,
    pub days_on_platform: i64,
    pub num_transactions: u64,
    pub total_quantity: f64,
    pub avg_quantity: f64,
    pub total_spend: f64,
    pub avg_spend: f64,
    pub region: String,
    /// Distinct categories this customer bought at least once
    pub categories: BTreeSet<String>,
}

impl CustomerFeatures {
    /// Lay the features out against `schema`.
    /// Indicator columns with no matching value stay 0.
    pub fn to_vector(&self, schema: &FeatureSchema) -> Vector {
        let mut data = vec![0.0; schema.dim()];
        data[0] = self.days_on_platform as f64;
        data[1] = self.num_transactions as f64;
        data[2] = self.total_quantity;
        data[3] = self.avg_quantity;
        data[4] = self.total_spend;
        data[5] = self.avg_spend;

        if let Some(i) = schema.region_index(&self.region) {
            data[i] = 1.0;
        }
        for category in &self.categories {
            if let Some(i) = schema.category_index(category) {
                data[i] = 1.0;
            }
        }
        Vector::new(data)
    }
}

/// Counters for records the join could not use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Transactions dropped because their product is not in the catalog
    pub dropped_transactions: usize,
    /// Transactions whose customer is not in the customer set (ignored)
    pub orphan_transactions: usize,
    /// Customers whose signup date lies after the reference date
    pub future_signups: usize,
}

/// Output of the feature builder: schema, customer ordering and rows
///
/// Row `i` of [`FeatureTable::vectors`] belongs to `rows[i].customer_id`; every
/// later stage is indexed by this ordering.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    schema: FeatureSchema,
    rows: Vec<CustomerFeatures>,
    index: AHashMap<CustomerId, usize>,
    report: BuildReport,
}

impl FeatureTable {
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[CustomerFeatures] {
        &self.rows
    }

    pub fn report(&self) -> BuildReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn customer_ids(&self) -> Vec<CustomerId> {
        self.rows.iter().map(|r| r.customer_id.clone()).collect()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&CustomerFeatures> {
        self.index_of(id).map(|i| &self.rows[i])
    }

    /// Raw (unscaled) vectors in customer order
    pub fn vectors(&self) -> Vec<Vector> {
        self.rows.iter().map(|r| r.to_vector(&self.schema)).collect()
    }
}

#[derive(Debug, Default)]
struct Aggregate {
    count: u64,
    quantity: f64,
    spend: f64,
    categories: BTreeSet<String>,
}

/// Builds a [`FeatureTable`] from raw records
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    reference_date: NaiveDate,
    missing_product_policy: MissingProductPolicy,
}

impl FeatureBuilder {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            missing_product_policy: MissingProductPolicy::default(),
        }
    }

    pub fn from_config(config: &LookalikeConfig) -> Self {
        Self {
            reference_date: config.reference_date,
            missing_product_policy: config.missing_product_policy,
        }
    }

    pub fn with_missing_product_policy(mut self, policy: MissingProductPolicy) -> Self {
        self.missing_product_policy = policy;
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn build(&self, dataset: &Dataset) -> Result<FeatureTable> {
        if dataset.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut catalog: AHashMap<&str, &str> = AHashMap::with_capacity(dataset.products.len());
        for product in &dataset.products {
            if catalog.insert(product.id.as_str(), product.category.as_str()).is_some() {
                return Err(Error::DuplicateProduct(product.id.clone()));
            }
        }

        let mut index: AHashMap<CustomerId, usize> = AHashMap::with_capacity(dataset.customers.len());
        for (i, customer) in dataset.customers.iter().enumerate() {
            if index.insert(customer.id.clone(), i).is_some() {
                return Err(Error::DuplicateCustomer(customer.id.to_string()));
            }
        }

        let schema = FeatureSchema::discover(dataset);
        debug!(
            regions = schema.regions.len(),
            categories = schema.categories.len(),
            dim = schema.dim(),
            "Feature schema discovered"
        );

        let mut report = BuildReport::default();
        let mut aggregates: Vec<Aggregate> = Vec::with_capacity(dataset.customers.len());
        aggregates.resize_with(dataset.customers.len(), Aggregate::default);

        for txn in &dataset.transactions {
            let Some(&slot) = index.get(&txn.customer_id) else {
                report.orphan_transactions += 1;
                continue;
            };

            let category = match catalog.get(txn.product_id.as_str()) {
                Some(category) => *category,
                None => match self.missing_product_policy {
                    MissingProductPolicy::Reject => {
                        return Err(Error::MissingReference {
                            transaction_id: txn.id.clone(),
                            product_id: txn.product_id.clone(),
                        });
                    }
                    MissingProductPolicy::Drop => {
                        report.dropped_transactions += 1;
                        continue;
                    }
                },
            };

            let agg = &mut aggregates[slot];
            agg.count += 1;
            agg.quantity += txn.quantity;
            agg.spend += txn.total_value;
            if !agg.categories.contains(category) {
                agg.categories.insert(category.to_string());
            }
        }

        let mut rows = Vec::with_capacity(dataset.customers.len());
        for (customer, agg) in dataset.customers.iter().zip(aggregates) {
            let mut days = (self.reference_date - customer.signup_date).num_days();
            if days < 0 {
                report.future_signups += 1;
                days = 0;
            }

            let (avg_quantity, avg_spend) = if agg.count > 0 {
                (agg.quantity / agg.count as f64, agg.spend / agg.count as f64)
            } else {
                (0.0, 0.0)
            };

            rows.push(CustomerFeatures {
                customer_id: customer.id.clone(),
                days_on_platform: days,
                num_transactions: agg.count,
                total_quantity: agg.quantity,
                avg_quantity,
                total_spend: agg.spend,
                avg_spend,
                region: customer.region.clone(),
                categories: agg.categories,
            });
        }

        if report.dropped_transactions > 0 {
            warn!(
                dropped = report.dropped_transactions,
                "Dropped transactions referencing products missing from the catalog"
            );
        }
        if report.orphan_transactions > 0 {
            warn!(
                orphans = report.orphan_transactions,
                "Ignored transactions for customers not in the customer set"
            );
        }
        if report.future_signups > 0 {
            warn!(
                customers = report.future_signups,
                reference_date = %self.reference_date,
                "Signup dates after the reference date clamped to 0 days on platform"
            );
        }

        Ok(FeatureTable {
            schema,
            rows,
            index,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookalike_core::{Customer, Product, Transaction};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_dataset() -> Dataset {
        Dataset::new(
            vec![
                Customer::new("C0001", "Asia", ymd(2024, 12, 1)),
                Customer::new("C0002", "Europe", ymd(2024, 6, 1)),
                Customer::new("C0003", "Asia", ymd(2023, 1, 1)),
            ],
            vec![
                Transaction::new("T1", "C0001", "P1", 2.0, 100.0, ymd(2024, 12, 5)),
                Transaction::new("T2", "C0001", "P2", 1.0, 50.0, ymd(2024, 12, 6)),
                Transaction::new("T3", "C0001", "P1", 3.0, 150.0, ymd(2024, 12, 7)),
                Transaction::new("T4", "C0002", "P2", 4.0, 40.0, ymd(2024, 7, 1)),
            ],
            vec![
                Product::new("P1", "Books"),
                Product::new("P2", "Electronics"),
                Product::new("P3", "Clothing"),
            ],
        )
    }

    fn builder() -> FeatureBuilder {
        FeatureBuilder::new(ymd(2025, 1, 1))
    }

    #[test]
    fn test_aggregates() {
        let table = builder().build(&sample_dataset()).unwrap();
        let c1 = table.get("C0001").unwrap();

        assert_eq!(c1.days_on_platform, 31);
        assert_eq!(c1.num_transactions, 3);
        assert!((c1.total_quantity - 6.0).abs() < 1e-12);
        assert!((c1.avg_quantity - 2.0).abs() < 1e-12);
        assert!((c1.total_spend - 300.0).abs() < 1e-12);
        assert!((c1.avg_spend - 100.0).abs() < 1e-12);
        assert_eq!(
            c1.categories.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["Books", "Electronics"]
        );
    }

    #[test]
    fn test_zero_fill_for_customer_without_transactions() {
        let table = builder().build(&sample_dataset()).unwrap();
        let c3 = table.get("C0003").unwrap();

        assert_eq!(c3.num_transactions, 0);
        assert_eq!(c3.total_quantity, 0.0);
        assert_eq!(c3.avg_quantity, 0.0);
        assert_eq!(c3.total_spend, 0.0);
        assert_eq!(c3.avg_spend, 0.0);
        assert!(c3.categories.is_empty());

        let vector = c3.to_vector(table.schema());
        let schema = table.schema();
        assert!(vector.as_slice()[schema.category_offset()..]
            .iter()
            .all(|v| *v == 0.0));
        assert!(vector.as_slice().iter().all(|v| v.is_finite()));
        // demographic columns are not zero-filled
        assert_eq!(c3.days_on_platform, 731);
        assert_eq!(vector.as_slice()[schema.region_index("Asia").unwrap()], 1.0);
    }

    #[test]
    fn test_dimensionality_invariant() {
        let table = builder().build(&sample_dataset()).unwrap();
        let dim = table.schema().dim();
        // 6 numeric + 2 regions + 3 catalog categories (Clothing never bought)
        assert_eq!(dim, 11);
        for vector in table.vectors() {
            assert_eq!(vector.dim(), dim);
        }
    }

    #[test]
    fn test_exactly_one_region_indicator() {
        let table = builder().build(&sample_dataset()).unwrap();
        let schema = table.schema();
        for vector in table.vectors() {
            let block = &vector.as_slice()[schema.region_offset()..schema.category_offset()];
            assert_eq!(block.iter().sum::<f64>(), 1.0);
        }
    }

    #[test]
    fn test_ordering_follows_customer_records() {
        let table = builder().build(&sample_dataset()).unwrap();
        let ids: Vec<String> = table.customer_ids().iter().map(|c| c.to_string()).collect();
        assert_eq!(ids, vec!["C0001", "C0002", "C0003"]);
        assert_eq!(table.index_of("C0002"), Some(1));
        assert_eq!(table.index_of("C9999"), None);
    }

    #[test]
    fn test_empty_customers_is_fatal() {
        let dataset = Dataset::default();
        assert!(matches!(builder().build(&dataset), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_missing_product_rejected_by_default() {
        let mut dataset = sample_dataset();
        dataset
            .transactions
            .push(Transaction::new("T9", "C0002", "P404", 1.0, 10.0, ymd(2024, 8, 1)));

        match builder().build(&dataset) {
            Err(Error::MissingReference { transaction_id, product_id }) => {
                assert_eq!(transaction_id, "T9");
                assert_eq!(product_id, "P404");
            }
            other => panic!("expected MissingReference, got {:?}", other.map(|t| t.len())),
        }
    }

    #[test]
    fn test_missing_product_dropped_and_counted() {
        let mut dataset = sample_dataset();
        dataset
            .transactions
            .push(Transaction::new("T9", "C0002", "P404", 1.0, 10.0, ymd(2024, 8, 1)));

        let table = builder()
            .with_missing_product_policy(MissingProductPolicy::Drop)
            .build(&dataset)
            .unwrap();
        assert_eq!(table.report().dropped_transactions, 1);
        assert_eq!(table.get("C0002").unwrap().num_transactions, 1);
    }

    #[test]
    fn test_orphan_transactions_ignored() {
        let mut dataset = sample_dataset();
        dataset
            .transactions
            .push(Transaction::new("T9", "C0500", "P1", 1.0, 10.0, ymd(2024, 8, 1)));

        let table = builder().build(&dataset).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.report().orphan_transactions, 1);
        assert!(table.get("C0500").is_none());
    }

    #[test]
    fn test_orphan_with_unknown_product_is_ignored_not_rejected() {
        let mut dataset = sample_dataset();
        dataset
            .transactions
            .push(Transaction::new("T9", "C0500", "P404", 1.0, 10.0, ymd(2024, 8, 1)));

        let table = builder().build(&dataset).unwrap();
        assert_eq!(table.report().orphan_transactions, 1);
        assert_eq!(table.report().dropped_transactions, 0);
    }

    #[test]
    fn test_duplicate_customer_rejected() {
        let mut dataset = sample_dataset();
        dataset.customers.push(Customer::new("C0001", "Europe", ymd(2024, 1, 1)));
        assert!(matches!(
            builder().build(&dataset),
            Err(Error::DuplicateCustomer(id)) if id == "C0001"
        ));
    }

    #[test]
    fn test_duplicate_product_rejected() {
        let mut dataset = sample_dataset();
        dataset.products.push(Product::new("P1", "Clothing"));
        assert!(matches!(
            builder().build(&dataset),
            Err(Error::DuplicateProduct(id)) if id == "P1"
        ));
    }

    #[test]
    fn test_future_signup_clamped() {
        let dataset = Dataset::new(
            vec![Customer::new("C0001", "Asia", ymd(2025, 3, 1))],
            vec![],
            vec![],
        );
        let table = builder().build(&dataset).unwrap();
        assert_eq!(table.get("C0001").unwrap().days_on_platform, 0);
        assert_eq!(table.report().future_signups, 1);
    }
}
