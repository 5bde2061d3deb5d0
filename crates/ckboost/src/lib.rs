//! # CKBoost
//!
//! Protocol state for CKBoost cells: molecule records, change detection
//! and update transactions.
//!
//! ## Overview
//!
//! - **Codec**: the molecule binary layout (structs, tables, vectors,
//!   options) driven by schemas resolved once at registration.
//! - **Types**: every CKBoost record with its invariants, plus the typed
//!   constructors that turn form input into records.
//! - **Diff**: per-field change-sets between the on-chain baseline and
//!   staged edits, recomputed behind a trailing-edge debounce.
//! - **Tx**: materialization of the next record and the update-transaction
//!   builder, with execution, signing and cell lookup behind traits.
//!
//! ## Key Concepts
//!
//! - **Baseline**: the record decoded from the live protocol cell. Never
//!   edited in place.
//! - **Staging**: add/remove lists and form values held next to the baseline.
//! - **Fallback**: a transaction built without the execution capability. It
//!   carries the code dependency but not the update.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ckboost::tx::capability::memory::{MemoryCells, MemoryExecutor, MemorySigner};
//! use ckboost::{Byte32, ManagerConfig, ProtocolManager};
//!
//! async fn example(config_json: &str) -> ckboost::Result<()> {
//!     let config = ManagerConfig::from_json(config_json)?;
//!     let cells = MemoryCells::new();
//!     let signer = Arc::new(MemorySigner::with_cells(cells.clone()));
//!
//!     let mut manager = ProtocolManager::new(config, cells, signer)
//!         .with_executor(Arc::new(MemoryExecutor::new()));
//!     let last_updated = manager.load().await?.last_updated;
//!
//!     let mut staging = manager.staging()?;
//!     staging.add_admin(Byte32::from_bytes([0xbb; 32]));
//!     manager.stage(staging)?;
//!
//!     let submission = manager.submit(last_updated + 1).await?;
//!     println!("sent {}", submission.tx_hash);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `ckboost::codec` - molecule primitives, schemas and the registry
//! - `ckboost::types` - domain records and constructors
//! - `ckboost::diff` - change-sets and debouncing
//! - `ckboost::tx` - capabilities and the transaction builder

pub mod error;
pub mod manager;

pub use ckboost_codec as codec;
pub use ckboost_diff as diff;
pub use ckboost_tx as tx;
pub use ckboost_types as types;

pub use error::{BoostError, Result};
pub use manager::{ManagerConfig, ProtocolManager, Submission};

pub use ckboost_codec::{Byte32, CodecError, Numeric, Uint256};
pub use ckboost_diff::{
    diff_encoded, diff_protocol, diff_protocol_data, DebounceConfig, DiffError, FieldChange,
    ProtocolChanges, ProtocolStaging,
};
pub use ckboost_tx::{BuildMode, BuilderConfig, UpdateTransactionBuilder};
pub use ckboost_types::{
    create_endorser_info, create_protocol_data, create_tipping_config, CampaignData, EndorserInfo,
    ProtocolConfig, ProtocolData, Record, Script, TippingConfig, ValidationError,
};
