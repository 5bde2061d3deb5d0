//! The domain schema registry.
//!
//! Every record kind is declared exactly once here, leaves first, and the
//! registry is built on first use and cached for the life of the process.
//! Nothing in this module has business logic.

use std::sync::OnceLock;

use ckboost_codec::{CodecError, FieldType, Schema, SchemaRegistry};

/// Schema names.
pub mod names {
    pub const SCRIPT: &str = "Script";
    pub const OUT_POINT: &str = "OutPoint";
    pub const CELL_INPUT: &str = "CellInput";
    pub const CELL_DEP: &str = "CellDep";
    pub const CELL_OUTPUT: &str = "CellOutput";
    pub const RAW_TRANSACTION: &str = "RawTransaction";
    pub const TRANSACTION: &str = "Transaction";
    pub const CONNECTED_TYPE_ID: &str = "ConnectedTypeID";
    pub const UDT_FUNDING: &str = "UDTFunding";
    pub const ASSET_LIST: &str = "AssetList";
    pub const ENDORSER_INFO: &str = "EndorserInfo";
    pub const TIPPING_PROPOSAL_METADATA: &str = "TippingProposalMetadata";
    pub const TIPPING_PROPOSAL_DATA: &str = "TippingProposalData";
    pub const TIPPING_CONFIG: &str = "TippingConfig";
    pub const QUEST_SUB_TASK_DATA: &str = "QuestSubTaskData";
    pub const COMPLETION_RECORD: &str = "CompletionRecord";
    pub const QUEST_DATA: &str = "QuestData";
    pub const CAMPAIGN_METADATA: &str = "CampaignMetadata";
    pub const CAMPAIGN_DATA: &str = "CampaignData";
    pub const SCRIPT_CODE_HASHES: &str = "ScriptCodeHashes";
    pub const PROTOCOL_CONFIG: &str = "ProtocolConfig";
    pub const PROTOCOL_DATA: &str = "ProtocolData";
    pub const USER_VERIFICATION_DATA: &str = "UserVerificationData";
    pub const USER_PROGRESS_DATA: &str = "UserProgressData";
    pub const USER_SUBMISSION_RECORD: &str = "UserSubmissionRecord";
    pub const USER_DATA: &str = "UserData";
}

use names::*;

fn composite(name: &'static str) -> FieldType {
    FieldType::Composite(name)
}

fn vec_of(element: FieldType) -> FieldType {
    FieldType::vector(element)
}

/// All domain schemas in registration order.
pub fn domain_schemas() -> Vec<Schema> {
    let bytes = || FieldType::VarBytes;
    let bytes_vec = || vec_of(FieldType::VarBytes);
    let byte32_vec = || vec_of(FieldType::BYTE32);

    vec![
        // Chain primitives
        Schema::table(SCRIPT)
            .field("code_hash", FieldType::BYTE32)
            .field("hash_type", FieldType::BYTE)
            .field("args", bytes()),
        Schema::structure(OUT_POINT)
            .field("tx_hash", FieldType::BYTE32)
            .field("index", FieldType::UINT32),
        Schema::structure(CELL_INPUT)
            .field("since", FieldType::UINT64)
            .field("previous_output", composite(OUT_POINT)),
        Schema::structure(CELL_DEP)
            .field("out_point", composite(OUT_POINT))
            .field("dep_type", FieldType::BYTE),
        Schema::table(CELL_OUTPUT)
            .field("capacity", FieldType::UINT64)
            .field("lock", composite(SCRIPT))
            .field("type_", FieldType::option(composite(SCRIPT))),
        Schema::table(RAW_TRANSACTION)
            .field("version", FieldType::UINT32)
            .field("cell_deps", vec_of(composite(CELL_DEP)))
            .field("header_deps", byte32_vec())
            .field("inputs", vec_of(composite(CELL_INPUT)))
            .field("outputs", vec_of(composite(CELL_OUTPUT)))
            .field("outputs_data", bytes_vec()),
        Schema::table(TRANSACTION)
            .field("raw", composite(RAW_TRANSACTION))
            .field("witnesses", bytes_vec()),
        Schema::structure(CONNECTED_TYPE_ID)
            .field("type_id", FieldType::BYTE32)
            .field("connected_key", FieldType::BYTE32),
        // Assets
        Schema::table(UDT_FUNDING)
            .field("udt_script", composite(SCRIPT))
            .field("amount", FieldType::UINT128),
        Schema::table(ASSET_LIST)
            .field("ckb_amount", FieldType::UINT64)
            .field("nft_assets", vec_of(composite(SCRIPT)))
            .field("udt_assets", vec_of(composite(UDT_FUNDING))),
        // Endorsers and tipping
        Schema::table(ENDORSER_INFO)
            .field("endorser_lock_hash", FieldType::BYTE32)
            .field("endorser_name", bytes())
            .field("endorser_description", bytes())
            .field("website", bytes())
            .field("social_links", bytes_vec())
            .field("verified", FieldType::BYTE),
        Schema::table(TIPPING_PROPOSAL_METADATA)
            .field("title", bytes())
            .field("tags", bytes_vec())
            .field("description", bytes())
            .field("created_at", FieldType::UINT64),
        Schema::table(TIPPING_PROPOSAL_DATA)
            .field("target_address", bytes())
            .field("proposer_lock_hash", FieldType::BYTE32)
            .field("metadata", composite(TIPPING_PROPOSAL_METADATA))
            .field("amount", FieldType::UINT64)
            .field("tipping_transaction_hash", FieldType::option(FieldType::BYTE32))
            .field("approval_transaction_hash", byte32_vec()),
        Schema::table(TIPPING_CONFIG)
            .field("approval_requirement_thresholds", vec_of(FieldType::UINT128))
            .field("expiration_duration", FieldType::UINT64),
        // Quests and campaigns
        Schema::table(QUEST_SUB_TASK_DATA)
            .field("id", FieldType::BYTE)
            .field("title", bytes())
            .field("task_type", bytes())
            .field("description", bytes())
            .field("proof_required", bytes()),
        Schema::table(COMPLETION_RECORD)
            .field("user_address", bytes())
            .field("sub_task_id", FieldType::BYTE)
            .field("completion_timestamp", FieldType::UINT64)
            .field("completion_content", bytes()),
        Schema::table(QUEST_DATA)
            .field("id", FieldType::UINT32)
            .field("campaign_id", FieldType::BYTE32)
            .field("title", bytes())
            .field("description", bytes())
            .field("requirements", bytes())
            .field("rewards_on_completion", vec_of(composite(ASSET_LIST)))
            .field("completion_records", vec_of(composite(COMPLETION_RECORD)))
            .field("completion_deadline", FieldType::UINT64)
            .field("status", FieldType::BYTE)
            .field("sub_tasks", vec_of(composite(QUEST_SUB_TASK_DATA)))
            .field("points", FieldType::UINT32)
            .field("difficulty", FieldType::BYTE)
            .field("time_estimate", FieldType::UINT32)
            .field("completion_count", FieldType::UINT32),
        Schema::table(CAMPAIGN_METADATA)
            .field("funding_info", vec_of(composite(ASSET_LIST)))
            .field("created_at", FieldType::UINT64)
            .field("starting_time", FieldType::UINT64)
            .field("ending_time", FieldType::UINT64)
            .field("verification_requirements", FieldType::UINT32)
            .field("last_updated", FieldType::UINT64)
            .field("categories", bytes_vec())
            .field("difficulty", FieldType::BYTE)
            .field("image_url", bytes())
            .field("rules", bytes_vec()),
        Schema::table(CAMPAIGN_DATA)
            .field("id", FieldType::BYTE32)
            .field("creator", composite(SCRIPT))
            .field("metadata", composite(CAMPAIGN_METADATA))
            .field("status", FieldType::BYTE)
            .field("quests", vec_of(composite(QUEST_DATA)))
            .field("title", bytes())
            .field("short_description", bytes())
            .field("long_description", bytes())
            .field("endorser_info", composite(ENDORSER_INFO))
            .field("participants_count", FieldType::UINT32)
            .field("total_completions", FieldType::UINT32),
        // Protocol
        Schema::table(SCRIPT_CODE_HASHES)
            .field("ckb_boost_protocol_type_code_hash", FieldType::BYTE32)
            .field("ckb_boost_protocol_lock_code_hash", FieldType::BYTE32)
            .field("ckb_boost_campaign_type_code_hash", FieldType::BYTE32)
            .field("ckb_boost_campaign_lock_code_hash", FieldType::BYTE32)
            .field("ckb_boost_user_type_code_hash", FieldType::BYTE32)
            .field("ckb_boost_points_udt_type_code_hash", FieldType::BYTE32)
            .field("accepted_udt_type_scripts", vec_of(composite(SCRIPT)))
            .field("accepted_dob_type_scripts", vec_of(composite(SCRIPT))),
        Schema::table(PROTOCOL_CONFIG)
            .field("admin_lock_hash_vec", byte32_vec())
            .field("script_code_hashes", composite(SCRIPT_CODE_HASHES)),
        Schema::table(PROTOCOL_DATA)
            .field("campaigns_approved", vec_of(composite(CAMPAIGN_DATA)))
            .field("tipping_proposals", vec_of(composite(TIPPING_PROPOSAL_DATA)))
            .field("tipping_config", composite(TIPPING_CONFIG))
            .field("endorsers_whitelist", vec_of(composite(ENDORSER_INFO)))
            .field("last_updated", FieldType::UINT64)
            .field("protocol_config", composite(PROTOCOL_CONFIG)),
        // Users
        Schema::table(USER_VERIFICATION_DATA)
            .field("user_address", bytes())
            .field("telegram_personal_chat_id", FieldType::UINT128)
            .field("identity_verification_data", bytes()),
        Schema::table(USER_PROGRESS_DATA)
            .field("campaign_id", FieldType::BYTE32)
            .field("completed_quest_ids", vec_of(FieldType::UINT32))
            .field("total_points_earned", FieldType::UINT32)
            .field("last_activity_timestamp", FieldType::UINT64),
        Schema::table(USER_SUBMISSION_RECORD)
            .field("campaign_id", FieldType::BYTE32)
            .field("quest_id", FieldType::UINT32)
            .field("submission_timestamp", FieldType::UINT64)
            .field("submission_content", bytes()),
        Schema::table(USER_DATA)
            .field("verification_data", composite(USER_VERIFICATION_DATA))
            .field("total_points_earned", FieldType::UINT32)
            .field("last_activity_timestamp", FieldType::UINT64)
            .field("submission_records", vec_of(composite(USER_SUBMISSION_RECORD)))
            .field("campaign_progress", vec_of(composite(USER_PROGRESS_DATA))),
    ]
}

/// Build a fresh registry holding every domain schema.
pub fn build_registry() -> Result<SchemaRegistry, CodecError> {
    let mut registry = SchemaRegistry::new();
    registry.register_all(domain_schemas())?;
    Ok(registry)
}

static REGISTRY: OnceLock<Result<SchemaRegistry, CodecError>> = OnceLock::new();

/// The process-wide domain registry, built once.
pub fn registry() -> Result<&'static SchemaRegistry, CodecError> {
    REGISTRY.get_or_init(build_registry).as_ref().map_err(Clone::clone)
}
