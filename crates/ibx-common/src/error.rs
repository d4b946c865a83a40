//! Error types for ibx-common.

use thiserror::Error;

/// Common error type for byte-level operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer at offset {offset}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
