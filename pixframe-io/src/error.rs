//! I/O error types.

use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding or encoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed record in an event file.
    #[error("invalid event at line {line}: {message}")]
    InvalidEvent { line: usize, message: String },

    /// Run header content that cannot describe a valid geometry.
    #[error("invalid run header: {0}")]
    InvalidHeader(String),

    /// Cluster field does not fit its binary record slot.
    #[error("{field} value {value} does not fit the binary cluster record")]
    ValueOutOfRange { field: &'static str, value: usize },

    /// Core library error.
    #[error("core error: {0}")]
    CoreError(#[from] pixframe_core::Error),
}
