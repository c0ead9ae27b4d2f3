//! Error types for the index compiler.

use thiserror::Error;

/// Compiler errors.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Input is not valid GeoJSON for this pipeline (parse failure,
    /// unsupported geometry kind, malformed ring, too many features).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// I/O failure while reading input or writing the tree.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cooperative cancellation tripped; no output was persisted.
    #[error("build cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for BuildError {
    fn from(e: serde_json::Error) -> Self {
        BuildError::InvalidInput(e.to_string())
    }
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, BuildError>;
