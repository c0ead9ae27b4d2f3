//! Error types for the lookup side.

use thiserror::Error;

/// Lookup errors.
#[derive(Error, Debug)]
pub enum LookupError {
    /// Longitude outside `[-180, 180]` (or NaN).
    #[error("longitude out of range: {0}")]
    LongitudeOutOfRange(f32),

    /// Latitude outside `[-90, 90]` (or NaN).
    #[error("latitude out of range: {0}")]
    LatitudeOutOfRange(f32),

    /// Time-zone index `0` or past the id table.
    #[error("time-zone index out of range: {0}")]
    IndexOutOfRange(u16),

    /// Id not present in the loaded tree.
    #[error("unknown time-zone id: {0}")]
    UnknownId(String),

    /// Configuration change after the tree was materialized.
    #[error("lookup data already loaded")]
    AlreadyLoaded,

    /// Data file or stream could not be read.
    #[error("data not readable: {0}")]
    NotReadable(#[from] std::io::Error),

    /// The stream violated the tree encoding.
    #[error("malformed tree data at byte {offset}: {message}")]
    Malformed { offset: u64, message: String },
}

/// Result type for lookup operations.
pub type Result<T> = std::result::Result<T, LookupError>;
