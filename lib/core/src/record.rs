use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Customer identifier, canonically `C` followed by zero-padded digits (`C0001`).
///
/// Ordering is plain string ordering, which matches numeric ordering for
/// identifiers of the canonical width.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Canonical form for a numeric index, e.g. `from_index(7) == "C0007"`
    pub fn from_index(index: u32) -> Self {
        Self(format!("C{:04}", index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CustomerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CustomerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for CustomerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A customer as loaded from the customer record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub region: String,
    pub signup_date: NaiveDate,
    /// Demographic columns the engine does not use, carried through untouched
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Customer {
    pub fn new(id: impl Into<CustomerId>, region: impl Into<String>, signup_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            region: region.into(),
            signup_date,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub customer_id: CustomerId,
    pub product_id: String,
    pub quantity: f64,
    pub total_value: f64,
    pub date: NaiveDate,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        customer_id: impl Into<CustomerId>,
        product_id: impl Into<String>,
        quantity: f64,
        total_value: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            customer_id: customer_id.into(),
            product_id: product_id.into(),
            quantity,
            total_value,
            date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Product {
    pub fn new(id: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            attributes: BTreeMap::new(),
        }
    }
}

/// The three raw record sets one run works on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub customers: Vec<Customer>,
    pub transactions: Vec<Transaction>,
    pub products: Vec<Product>,
}

impl Dataset {
    pub fn new(customers: Vec<Customer>, transactions: Vec<Transaction>, products: Vec<Product>) -> Self {
        Self {
            customers,
            transactions,
            products,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }
}
