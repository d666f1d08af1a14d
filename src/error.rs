use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No customers selected")]
    NothingSelected,

    #[error("Please select an invoice date")]
    MissingInvoiceDate,

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid month (expected YYYY-MM): {0}")]
    InvalidMonth(String),

    #[error("No customer at position {0}")]
    CustomerIndex(usize),

    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Invoice ids exhausted: no id left above the highest existing one")]
    IdsExhausted,

    #[error("Invalid amount assignment (expected NAME=VALUE): {0}")]
    AmountAssignment(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Settings write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Prompt cancelled: {0}")]
    Prompt(#[from] inquire::InquireError),
}

pub type Result<T> = std::result::Result<T, Error>;
