use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No customers loaded: nothing to compare")]
    EmptyInput,

    #[error("Transaction {transaction_id} references unknown product {product_id}")]
    MissingReference {
        transaction_id: String,
        product_id: String,
    },

    #[error("Unknown customer: {0}")]
    UnknownCustomer(String),

    #[error("Duplicate customer id: {0}")]
    DuplicateCustomer(String),

    #[error("Duplicate product id: {0}")]
    DuplicateProduct(String),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
