//! Error types for change detection.

use std::fmt;

use thiserror::Error;

/// Which input a diff failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Baseline,
    Candidate,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Baseline => f.write_str("baseline"),
            Side::Candidate => f.write_str("candidate"),
        }
    }
}

/// Errors raised while computing a change-set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiffError {
    /// One of the compared records is malformed. No change-set is produced.
    #[error("diff computation failed on {side} ({field}): {reason}")]
    DiffComputation {
        side: Side,
        field: String,
        reason: String,
    },
}

impl DiffError {
    pub fn baseline(field: impl Into<String>, reason: impl fmt::Display) -> Self {
        DiffError::DiffComputation {
            side: Side::Baseline,
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    pub fn candidate(field: impl Into<String>, reason: impl fmt::Display) -> Self {
        DiffError::DiffComputation {
            side: Side::Candidate,
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<ckboost_types::ValidationError> for DiffError {
    fn from(err: ckboost_types::ValidationError) -> Self {
        DiffError::candidate(err.field, err.message)
    }
}

/// Result type for diff operations.
pub type Result<T> = std::result::Result<T, DiffError>;
