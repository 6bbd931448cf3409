//! CSV data loader
//!
//! Reads the three record sets from a data directory. Columns are located
//! by header name; required columns must be present, anything else is
//! carried along as pass-through attributes.

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use lookalike_core::{Customer, Dataset, Product, Transaction};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;

pub const CUSTOMERS_FILE: &str = "Customers.csv";
pub const TRANSACTIONS_FILE: &str = "Transactions.csv";
pub const PRODUCTS_FILE: &str = "Products.csv";

/// A parsed CSV file: header plus data rows
#[derive(Debug, Clone)]
pub struct CsvTable {
    path: PathBuf,
    header: Vec<String>,
    rows: Vec<(usize, Vec<String>)>,
}

impl CsvTable {
    /// Read and parse a whole file. The file is closed before this returns.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("reading {}", path.display()))?;
            let line_no = i + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_record(&line)
                .with_context(|| format!("{}:{}", path.display(), line_no))?;
            match header {
                None => {
                    let mut names = fields;
                    if let Some(first) = names.first_mut() {
                        *first = first.trim_start_matches('\u{feff}').to_string();
                    }
                    header = Some(names);
                }
                Some(_) => rows.push((line_no, fields)),
            }
        }

        let header = header.ok_or_else(|| anyhow!("{} is empty: missing header row", path.display()))?;
        Ok(Self { path, header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a required column
    pub fn column(&self, name: &str) -> Result<usize> {
        self.header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("{}: missing required column '{}'", self.path.display(), name))
    }

    /// Map every row through `parse`, tagging errors with file and line
    fn parse_rows<T>(&self, mut parse: impl FnMut(&Row<'_>) -> Result<T>) -> Result<Vec<T>> {
        self.rows
            .iter()
            .map(|(line_no, fields)| {
                if fields.len() != self.header.len() {
                    return Err(anyhow!(
                        "{}:{}: expected {} fields, found {}",
                        self.path.display(),
                        line_no,
                        self.header.len(),
                        fields.len()
                    ));
                }
                let row = Row {
                    header: &self.header,
                    fields,
                };
                parse(&row).with_context(|| format!("{}:{}", self.path.display(), line_no))
            })
            .collect()
    }
}

struct Row<'a> {
    header: &'a [String],
    fields: &'a [String],
}

impl Row<'_> {
    fn get(&self, column: usize) -> &str {
        self.fields[column].trim()
    }

    fn number(&self, column: usize) -> Result<f64> {
        let raw = self.get(column);
        let value: f64 = raw
            .parse()
            .with_context(|| format!("column '{}': invalid number '{}'", self.header[column], raw))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow!(
                "column '{}': expected a non-negative number, got '{}'",
                self.header[column],
                raw
            ));
        }
        Ok(value)
    }

    fn date(&self, column: usize) -> Result<NaiveDate> {
        parse_date(self.get(column)).with_context(|| format!("column '{}'", self.header[column]))
    }

    /// Every column not in `used`, by header name
    fn attributes(&self, used: &[usize]) -> BTreeMap<String, String> {
        self.header
            .iter()
            .zip(self.fields)
            .enumerate()
            .filter(|(i, _)| !used.contains(i))
            .map(|(_, (name, value))| (name.clone(), value.clone()))
            .collect()
    }
}

/// Split one CSV record. Double-quoted fields may contain commas and `""` escapes.
pub fn split_record(line: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            ('"', false) if field.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut field)),
            (c, _) => field.push(c),
        }
    }
    if in_quotes {
        return Err(anyhow!("unterminated quoted field"));
    }
    fields.push(field);
    Ok(fields)
}

/// Parse `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS` (the time part is discarded)
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date())
        .with_context(|| format!("invalid date '{}'", raw))
}

/// Loads a [`Dataset`] from `Customers.csv`, `Transactions.csv` and `Products.csv`
#[derive(Debug, Clone)]
pub struct CsvLoader {
    data_dir: PathBuf,
}

impl CsvLoader {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn load(&self) -> Result<Dataset> {
        let customers = load_customers(self.data_dir.join(CUSTOMERS_FILE))?;
        let products = load_products(self.data_dir.join(PRODUCTS_FILE))?;
        let transactions = load_transactions(self.data_dir.join(TRANSACTIONS_FILE))?;

        info!(
            customers = customers.len(),
            transactions = transactions.len(),
            products = products.len(),
            "Loaded dataset from {}",
            self.data_dir.display()
        );
        Ok(Dataset::new(customers, transactions, products))
    }
}

pub fn load_customers<P: AsRef<Path>>(path: P) -> Result<Vec<Customer>> {
    let table = CsvTable::read(path)?;
    let id = table.column("CustomerID")?;
    let region = table.column("Region")?;
    let signup = table.column("SignupDate")?;

    table.parse_rows(|row| {
        Ok(Customer {
            id: row.get(id).into(),
            region: row.get(region).to_string(),
            signup_date: row.date(signup)?,
            attributes: row.attributes(&[id, region, signup]),
        })
    })
}

pub fn load_products<P: AsRef<Path>>(path: P) -> Result<Vec<Product>> {
    let table = CsvTable::read(path)?;
    let id = table.column("ProductID")?;
    let category = table.column("Category")?;

    table.parse_rows(|row| {
        Ok(Product {
            id: row.get(id).to_string(),
            category: row.get(category).to_string(),
            attributes: row.attributes(&[id, category]),
        })
    })
}

pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<Vec<Transaction>> {
    let table = CsvTable::read(path)?;
    let id = table.column("TransactionID")?;
    let customer = table.column("CustomerID")?;
    let product = table.column("ProductID")?;
    let date = table.column("TransactionDate")?;
    let quantity = table.column("Quantity")?;
    let total = table.column("TotalValue")?;

    table.parse_rows(|row| {
        Ok(Transaction::new(
            row.get(id),
            row.get(customer),
            row.get(product),
            row.number(quantity)?,
            row.number(total)?,
            row.date(date)?,
        ))
    })
}
