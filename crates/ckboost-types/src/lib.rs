//! CKBoost domain records.
//!
//! Every on-chain record kind lives here as a plain Rust struct implementing
//! [`Record`]. Byte layouts come from one registry, declared in
//! [`registry`] and built once per process. The [`facade`] module turns
//! client-shaped input (camelCase JSON, hex strings, loosely typed numbers)
//! into those records.

pub mod assets;
pub mod campaign;
pub mod endorser;
pub mod error;
pub mod facade;
pub mod protocol;
pub mod quest;
pub mod record;
pub mod registry;
pub mod script;
pub mod tipping;
pub mod transaction;
pub mod user;

pub use assets::{AssetList, UdtFunding};
pub use campaign::{CampaignData, CampaignMetadata};
pub use endorser::EndorserInfo;
pub use error::{TypesError, ValidationError};
pub use facade::{
    create_endorser_info, create_protocol_config, create_protocol_data, create_script,
    create_script_code_hashes, create_tipping_config, create_tipping_proposal, parse_byte32,
    parse_hash_type, parse_hex_bytes, EndorserInfoInput, ProtocolConfigInput, ProtocolDataInput,
    ScriptCodeHashesInput, ScriptInput, TippingConfigInput, TippingProposalInput,
};
pub use protocol::{ProtocolConfig, ProtocolData, ScriptCodeHashes};
pub use quest::{CompletionRecord, QuestData, QuestSubTaskData};
pub use record::Record;
pub use registry::{build_registry, registry};
pub use script::{CellDep, CellInput, CellOutput, ConnectedTypeId, DepType, HashType, OutPoint, Script};
pub use tipping::{TippingConfig, TippingProposalData, TippingProposalMetadata};
pub use transaction::{RawTransaction, Transaction};
pub use user::{UserData, UserProgressData, UserSubmissionRecord, UserVerificationData};

pub use ckboost_codec::{Byte32, CodecError, Numeric, Uint256};
