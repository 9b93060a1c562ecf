//! Error types for fractal_map

use thiserror::Error;

/// Result type alias for fractal_map operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fractal_map operations
///
/// A missing key is never an error: lookups and removals report absence
/// through `Option`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported operation on unmodifiable view: {0}")]
    Unsupported(&'static str),

    #[error("Key out of range for {0}")]
    OutOfRange(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
