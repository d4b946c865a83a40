//! Error types for batch conversion.

use thiserror::Error;

/// Errors that can occur while planning or running conversions.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoding, encoding or XML error from the format crate.
    #[error("{0}")]
    Format(#[from] ibx_format::Error),

    /// Error while walking an input directory.
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for batch operations.
pub type Result<T> = std::result::Result<T, Error>;
