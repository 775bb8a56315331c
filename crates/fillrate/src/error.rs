//! Error types for the fillrate library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for fillrate operations.
#[derive(Debug, Error)]
pub enum FillrateError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The data file has no header line.
    #[error("No header line found in '{0}'")]
    EmptyHeader(PathBuf),

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error (column selection, combinations, invalid values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A combination expression was empty or whitespace only.
    ///
    /// Callers react to this by falling back to the default combination.
    #[error("No combination expression provided")]
    NoExpression,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error saving or loading a session file.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The evaluation worker failed unexpectedly.
    #[error("Evaluation worker failed: {0}")]
    Worker(String),
}

impl FillrateError {
    /// Shorthand for a configuration error.
    pub(crate) fn config(message: impl Into<String>) -> Self {
        FillrateError::Config(message.into())
    }
}

/// Result type alias for fillrate operations.
pub type Result<T> = std::result::Result<T, FillrateError>;
