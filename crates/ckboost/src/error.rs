//! Error types for the protocol manager.

use ckboost_codec::CodecError;
use ckboost_diff::DiffError;
use ckboost_tx::TxError;
use ckboost_types::ValidationError;
use thiserror::Error;

/// Errors that can occur while loading, diffing or submitting protocol state.
#[derive(Debug, Error)]
pub enum BoostError {
    /// Encoding or decoding error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Change detection error.
    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    /// Transaction building, signing or sending error.
    #[error("transaction error: {0}")]
    Tx(#[from] TxError),

    /// No live cell carries the protocol type script.
    #[error("protocol cell not found")]
    ProtocolCellNotFound,

    /// `load` has not completed yet.
    #[error("protocol state not loaded")]
    NotLoaded,

    /// The latest staged edit did not produce a change-set.
    #[error("pending change-set failed: {0}")]
    DiffFailed(String),

    /// The staged state matches the baseline.
    #[error("nothing to update")]
    NothingToUpdate,

    /// The new record would not be newer than the one on chain.
    #[error("stale timestamp: {attempted} is not after {last_updated}")]
    StaleTimestamp { last_updated: u64, attempted: u64 },

    /// The manager configuration could not be parsed.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for manager operations.
pub type Result<T> = std::result::Result<T, BoostError>;
