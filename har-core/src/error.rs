//! Error types for header array operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`HarError`].
pub type Result<T> = std::result::Result<T, HarError>;

/// Errors produced while decoding, encoding, or assembling header arrays.
///
/// Parse errors abort the current array and surface to the caller; the
/// stream is not resynchronized. Set-consistency findings are *not* errors —
/// the validator collects [`crate::validate::SetMismatch`] records instead.
#[derive(Error, Debug)]
pub enum HarError {
    /// I/O failure on the underlying byte stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed bytes: frame-length mismatch, missing padding, unknown type
    /// code, label-count mismatch, dimensional-product disagreement.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The stream ended in the middle of a record or an array.
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// A partial lookup used a prefix that is not a valid set product.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A cross-check between solution metadata headers failed.
    #[error("data validation failed for {field}: expected {expected}, found {actual}")]
    DataValidation {
        field: String,
        expected: String,
        actual: String,
    },
}

impl HarError {
    /// Create an invalid-data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        HarError::InvalidData(msg.into())
    }

    /// Create a key-not-found error.
    pub fn key_not_found(key: impl Into<String>) -> Self {
        HarError::KeyNotFound(key.into())
    }

    /// Create a data-validation error.
    pub fn validation(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        HarError::DataValidation {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
