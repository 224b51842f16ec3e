//! Error types for the Verdict library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Verdict operations.
///
/// Only configuration and I/O problems surface here. Data-quality problems
/// are never errors: they are recorded as `Fail` outcomes in the report.
#[derive(Debug, Error)]
pub enum VerdictError {
    /// Error reading a dataset or writing a report artifact.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A validator name was registered twice.
    #[error("Duplicate validator: '{0}' is already registered")]
    DuplicateValidator(String),

    /// A rule referenced a validator that is not registered.
    #[error("Unknown validator: '{0}'")]
    UnknownValidator(String),

    /// A rule referenced a field missing from the dataset schema.
    #[error("Rule '{rule}' references unbound field '{field}'")]
    UnboundField { rule: String, field: String },

    /// Empty file or no data to validate.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Verdict operations.
pub type Result<T> = std::result::Result<T, VerdictError>;
