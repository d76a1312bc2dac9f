//! Error types for tunemood

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset could not be read as CSV
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column header is absent from the dataset
    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    /// Every row was dropped during cleaning
    #[error("No valid records in dataset")]
    EmptyDataset,

    /// Brush bounds that are NaN or infinite
    #[error("Invalid brush range: {0}")]
    InvalidRange(String),

    /// View parameters that could not be parsed
    #[error("Invalid view config: {0}")]
    InvalidConfig(String),
}
