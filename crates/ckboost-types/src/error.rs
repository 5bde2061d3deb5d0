//! Error types for domain records and the input facade.

use ckboost_codec::{CodecError, NumericError};
use thiserror::Error;

/// A domain precondition failed for a specific field.
///
/// The message names the expected format so the caller can fix the input;
/// the binary layout has no redundancy to repair a malformed hash.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `protocolConfig.adminLockHashVec[1]`.
    pub field: String,
    /// What was wrong and what was expected.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn numeric(field: impl Into<String>, err: NumericError) -> Self {
        Self::new(field, err.to_string())
    }

    /// Prefix the field path with an enclosing field.
    pub fn within(self, parent: &str) -> Self {
        Self {
            field: format!("{}.{}", parent, self.field),
            message: self.message,
        }
    }
}

/// Errors from building or checking domain records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// Encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// An input or invariant check failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, ValidationError>;
