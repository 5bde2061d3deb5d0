//! Change detection for CKBoost protocol state.
//!
//! Compares a baseline [`ProtocolData`](ckboost_types::ProtocolData) with
//! staged edits (or with a second record) and produces a
//! [`ProtocolChanges`] carrying per-field old/new values and changed flags.
//! Recomputation on rapid edits goes through a trailing-edge
//! [`Debouncer`] whose results are guarded by generation.

pub mod change;
pub mod compare;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod protocol;

pub use change::FieldChange;
pub use compare::{apply_staging, membership_changed, scripts_changed, CanonicalScript};
pub use debounce::{DebounceConfig, Debouncer, Settled};
pub use engine::DiffEngine;
pub use error::{DiffError, Result, Side};
pub use protocol::{
    diff_encoded, diff_protocol, diff_protocol_data, staging_between, ProtocolChanges,
    ProtocolStaging, ScriptCodeHashesChanges, TippingConfigChanges,
};
