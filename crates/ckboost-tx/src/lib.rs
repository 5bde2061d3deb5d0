//! Update transactions for CKBoost records.
//!
//! ## Overview
//!
//! - [`materialize_protocol_data`] merges a change-set into the baseline
//!   and checks the result against the protocol invariants.
//! - [`UpdateTransactionBuilder`] turns the encoded record into a
//!   transaction through an [`ExecutionCapability`], always attaching the
//!   record's code cell as a `code` dependency.
//! - [`Signer`] and [`CellQuery`] are the remaining boundaries to a node or
//!   wallet. In-memory versions of all three live in [`capability::memory`].
//!
//! A transaction built without the execution capability is marked
//! [`BuildMode::Fallback`]: it carries the dependency but not the update.

pub mod builder;
pub mod capability;
pub mod error;
pub mod materialize;

pub use builder::{BuildMode, BuilderConfig, BuiltTransaction, UpdateTransactionBuilder};
pub use capability::{Cell, CellQuery, ExecutionCapability, ExecutionContext, Signer};
pub use error::{Result, TxError};
pub use materialize::materialize_protocol_data;
