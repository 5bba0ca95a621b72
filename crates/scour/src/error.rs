//! Error types for the scour library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scour operations.
#[derive(Debug, Error)]
pub enum ScourError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Empty file or no data to work on.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A column referenced by an operation does not exist.
    #[error("Column not found: '{0}'")]
    ColumnNotFound(String),

    /// A detector or wrangler name could not be resolved.
    ///
    /// Aborts the whole pass: no partial result is ever returned.
    #[error("Could not resolve {kind} plugin '{name}'")]
    PluginResolution { kind: &'static str, name: String },

    /// A wrangler, predicate or value function failed.
    #[error("Wrangler error: {0}")]
    Wrangler(String),

    /// Failure saving or loading session artifacts.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Result type alias for scour operations.
pub type Result<T> = std::result::Result<T, ScourError>;
