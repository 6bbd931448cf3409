pub mod loader;
pub mod writer;

pub use loader::{CsvLoader, CsvTable, CUSTOMERS_FILE, PRODUCTS_FILE, TRANSACTIONS_FILE};
pub use writer::{write_schema, ResultWriter, DEFAULT_OUTPUT_FILE};
