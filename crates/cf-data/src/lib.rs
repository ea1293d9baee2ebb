//! Dataset loading for the cross-filter dashboard
//!
//! Sources read a complete dataset once and normalize every row into a
//! [`cf_core::Record`]. Missing and malformed values are resolved here so the
//! chart pipelines only ever see typed fields.

pub mod config;
pub mod index;
pub mod schema;
pub mod sources;

use arrow::error::ArrowError;
use tokio::task::JoinError;
use thiserror::Error;

// Re-exports
pub use config::{FileType, LoadConfig, NullConfig};
pub use index::FilterOptions;
pub use schema::{FieldMapping, LoadStats};
pub use sources::{BatchSource, CsvSource, JsonSource};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    
    #[error("Arrow error: {0}")]
    Arrow(ArrowError),
    
    #[error("CSV parsing error: {0}")]
    Csv(String),
    
    #[error("Unexpected data shape: {0}")]
    Shape(String),
    
    #[error("Unknown record field in mapping: {0}")]
    UnknownField(String),
    
    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<ArrowError> for DataError {
    fn from(error: ArrowError) -> Self {
        DataError::Arrow(error)
    }
}
