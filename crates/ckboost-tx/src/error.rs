//! Error types for transaction building.

use ckboost_codec::{Byte32, CodecError};
use ckboost_types::ValidationError;
use thiserror::Error;

/// Errors raised while materializing, building, signing or sending an update.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TxError {
    /// The execution capability reported a failure. Never retried here.
    #[error("execution error: {0}")]
    Execution(String),

    /// The code cell a dependency points at is not live.
    #[error("code cell not found: {tx_hash}:{index}")]
    CodeCellNotFound { tx_hash: Byte32, index: u32 },

    /// The signer could not complete or send the transaction.
    #[error("signer error: {0}")]
    Signer(String),

    /// Cell lookup failed.
    #[error("cell query error: {0}")]
    CellQuery(String),

    /// The execution capability answered with something that is not a transaction.
    #[error("invalid execution response: {0}")]
    InvalidResponse(String),

    /// Encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The next record breaks a domain invariant.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Result type for transaction operations.
pub type Result<T> = std::result::Result<T, TxError>;
