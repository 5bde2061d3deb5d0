//! Proptest generators for property-based testing.

use bytes::Bytes;
use proptest::prelude::*;

use ckboost_codec::Byte32;
use ckboost_types::{
    AssetList, CampaignData, CampaignMetadata, CellDep, CellInput, CellOutput, CompletionRecord,
    ConnectedTypeId, DepType, EndorserInfo, HashType, OutPoint, ProtocolConfig, ProtocolData,
    QuestData, QuestSubTaskData, RawTransaction, Script, ScriptCodeHashes, TippingConfig,
    TippingProposalData, TippingProposalMetadata, Transaction, UdtFunding, UserData,
    UserProgressData, UserSubmissionRecord, UserVerificationData,
};

/// Generate a random Byte32.
pub fn byte32() -> impl Strategy<Value = Byte32> {
    any::<[u8; 32]>().prop_map(Byte32::from_bytes)
}

/// Generate a byte string of at most `max_len` bytes.
pub fn bytes(max_len: usize) -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..=max_len).prop_map(Bytes::from)
}

/// Generate a short list of short byte strings.
pub fn bytes_vec() -> impl Strategy<Value = Vec<Bytes>> {
    prop::collection::vec(bytes(24), 0..4)
}

/// Generate a HashType.
pub fn hash_type() -> impl Strategy<Value = HashType> {
    prop_oneof![
        Just(HashType::Data),
        Just(HashType::Type),
        Just(HashType::Data1),
        Just(HashType::Data2),
    ]
}

pub fn script() -> impl Strategy<Value = Script> {
    (byte32(), hash_type(), bytes(40)).prop_map(|(code_hash, hash_type, args)| Script {
        code_hash,
        hash_type,
        args,
    })
}

pub fn scripts() -> impl Strategy<Value = Vec<Script>> {
    prop::collection::vec(script(), 0..3)
}

// ─────────────────────────────────────────────────────────────────────────────
// Chain records
// ─────────────────────────────────────────────────────────────────────────────

pub fn out_point() -> impl Strategy<Value = OutPoint> {
    (byte32(), any::<u32>()).prop_map(|(tx_hash, index)| OutPoint::new(tx_hash, index))
}

pub fn cell_dep() -> impl Strategy<Value = CellDep> {
    (out_point(), prop_oneof![Just(DepType::Code), Just(DepType::DepGroup)])
        .prop_map(|(out_point, dep_type)| CellDep { out_point, dep_type })
}

pub fn cell_input() -> impl Strategy<Value = CellInput> {
    (any::<u64>(), out_point()).prop_map(|(since, previous_output)| CellInput {
        since,
        previous_output,
    })
}

pub fn cell_output() -> impl Strategy<Value = CellOutput> {
    (any::<u64>(), script(), prop::option::of(script())).prop_map(|(capacity, lock, type_)| {
        CellOutput {
            capacity,
            lock,
            type_,
        }
    })
}

pub fn transaction() -> impl Strategy<Value = Transaction> {
    (
        any::<u32>(),
        prop::collection::vec(cell_dep(), 0..3),
        prop::collection::vec(byte32(), 0..2),
        prop::collection::vec(cell_input(), 0..3),
        prop::collection::vec(cell_output(), 0..3),
        bytes_vec(),
        bytes_vec(),
    )
        .prop_map(
            |(version, cell_deps, header_deps, inputs, outputs, outputs_data, witnesses)| {
                Transaction {
                    raw: RawTransaction {
                        version,
                        cell_deps,
                        header_deps,
                        inputs,
                        outputs,
                        outputs_data,
                    },
                    witnesses,
                }
            },
        )
}

pub fn connected_type_id() -> impl Strategy<Value = ConnectedTypeId> {
    (byte32(), byte32()).prop_map(|(type_id, connected_key)| ConnectedTypeId {
        type_id,
        connected_key,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Assets, endorsers, tipping
// ─────────────────────────────────────────────────────────────────────────────

pub fn udt_funding() -> impl Strategy<Value = UdtFunding> {
    (script(), any::<u128>()).prop_map(|(udt_script, amount)| UdtFunding { udt_script, amount })
}

pub fn asset_list() -> impl Strategy<Value = AssetList> {
    (
        any::<u64>(),
        scripts(),
        prop::collection::vec(udt_funding(), 0..3),
    )
        .prop_map(|(ckb_amount, nft_assets, udt_assets)| AssetList {
            ckb_amount,
            nft_assets,
            udt_assets,
        })
}

pub fn endorser_info() -> impl Strategy<Value = EndorserInfo> {
    (byte32(), bytes(32), bytes(64), bytes(32), bytes_vec(), 0u8..=1).prop_map(
        |(endorser_lock_hash, endorser_name, endorser_description, website, social_links, verified)| {
            EndorserInfo {
                endorser_lock_hash,
                endorser_name,
                endorser_description,
                website,
                social_links,
                verified,
            }
        },
    )
}

pub fn tipping_config() -> impl Strategy<Value = TippingConfig> {
    (prop::collection::vec(any::<u128>(), 0..4), any::<u64>()).prop_map(
        |(approval_requirement_thresholds, expiration_duration)| TippingConfig {
            approval_requirement_thresholds,
            expiration_duration,
        },
    )
}

pub fn tipping_proposal_metadata() -> impl Strategy<Value = TippingProposalMetadata> {
    (bytes(32), bytes_vec(), bytes(64), any::<u64>()).prop_map(
        |(title, tags, description, created_at)| TippingProposalMetadata {
            title,
            tags,
            description,
            created_at,
        },
    )
}

pub fn tipping_proposal() -> impl Strategy<Value = TippingProposalData> {
    (
        bytes(48),
        byte32(),
        tipping_proposal_metadata(),
        any::<u64>(),
        prop::option::of(byte32()),
        prop::collection::vec(byte32(), 0..3),
    )
        .prop_map(
            |(
                target_address,
                proposer_lock_hash,
                metadata,
                amount,
                tipping_transaction_hash,
                approval_transaction_hash,
            )| TippingProposalData {
                target_address,
                proposer_lock_hash,
                metadata,
                amount,
                tipping_transaction_hash,
                approval_transaction_hash,
            },
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// Quests and campaigns
// ─────────────────────────────────────────────────────────────────────────────

pub fn quest_sub_task() -> impl Strategy<Value = QuestSubTaskData> {
    (any::<u8>(), bytes(24), bytes(12), bytes(48), bytes(24)).prop_map(
        |(id, title, task_type, description, proof_required)| QuestSubTaskData {
            id,
            title,
            task_type,
            description,
            proof_required,
        },
    )
}

pub fn completion_record() -> impl Strategy<Value = CompletionRecord> {
    (bytes(48), any::<u8>(), any::<u64>(), bytes(48)).prop_map(
        |(user_address, sub_task_id, completion_timestamp, completion_content)| CompletionRecord {
            user_address,
            sub_task_id,
            completion_timestamp,
            completion_content,
        },
    )
}

/// Generate a quest whose completion count matches its records.
pub fn quest() -> impl Strategy<Value = QuestData> {
    let text = (any::<u32>(), byte32(), bytes(24), bytes(48), bytes(48));
    let body = (
        prop::collection::vec(asset_list(), 0..2),
        prop::collection::vec(completion_record(), 0..3),
        any::<u64>(),
        any::<u8>(),
        prop::collection::vec(quest_sub_task(), 0..3),
        any::<u32>(),
        any::<u8>(),
        any::<u32>(),
    );
    (text, body).prop_map(
        |(
            (id, campaign_id, title, description, requirements),
            (
                rewards_on_completion,
                completion_records,
                completion_deadline,
                status,
                sub_tasks,
                points,
                difficulty,
                time_estimate,
            ),
        )| QuestData {
            id,
            campaign_id,
            title,
            description,
            requirements,
            rewards_on_completion,
            completion_count: completion_records.len() as u32,
            completion_records,
            completion_deadline,
            status,
            sub_tasks,
            points,
            difficulty,
            time_estimate,
        },
    )
}

/// Generate campaign metadata with `starting_time <= ending_time`.
pub fn campaign_metadata() -> impl Strategy<Value = CampaignMetadata> {
    (
        prop::collection::vec(asset_list(), 0..2),
        any::<u64>(),
        any::<u64>(),
        any::<u64>(),
        any::<u32>(),
        any::<u64>(),
        bytes_vec(),
        any::<u8>(),
        bytes(64),
        bytes_vec(),
    )
        .prop_map(
            |(
                funding_info,
                created_at,
                a,
                b,
                verification_requirements,
                last_updated,
                categories,
                difficulty,
                image_url,
                rules,
            )| CampaignMetadata {
                funding_info,
                created_at,
                starting_time: a.min(b),
                ending_time: a.max(b),
                verification_requirements,
                last_updated,
                categories,
                difficulty,
                image_url,
                rules,
            },
        )
}

pub fn campaign() -> impl Strategy<Value = CampaignData> {
    (
        byte32(),
        script(),
        campaign_metadata(),
        any::<u8>(),
        prop::collection::vec(quest(), 0..2),
        bytes(32),
        bytes(64),
        bytes(128),
        endorser_info(),
        any::<u32>(),
        any::<u32>(),
    )
        .prop_map(
            |(
                id,
                creator,
                metadata,
                status,
                quests,
                title,
                short_description,
                long_description,
                endorser_info,
                participants_count,
                total_completions,
            )| CampaignData {
                id,
                creator,
                metadata,
                status,
                quests,
                title,
                short_description,
                long_description,
                endorser_info,
                participants_count,
                total_completions,
            },
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// Protocol
// ─────────────────────────────────────────────────────────────────────────────

pub fn script_code_hashes() -> impl Strategy<Value = ScriptCodeHashes> {
    (prop::array::uniform6(byte32()), scripts(), scripts()).prop_map(|(h, udt, dob)| {
        ScriptCodeHashes {
            ckb_boost_protocol_type_code_hash: h[0],
            ckb_boost_protocol_lock_code_hash: h[1],
            ckb_boost_campaign_type_code_hash: h[2],
            ckb_boost_campaign_lock_code_hash: h[3],
            ckb_boost_user_type_code_hash: h[4],
            ckb_boost_points_udt_type_code_hash: h[5],
            accepted_udt_type_scripts: udt,
            accepted_dob_type_scripts: dob,
        }
    })
}

/// Generate a protocol config with at least one admin.
pub fn protocol_config() -> impl Strategy<Value = ProtocolConfig> {
    (
        prop::collection::hash_set(byte32(), 1..4),
        script_code_hashes(),
    )
        .prop_map(|(admins, script_code_hashes)| ProtocolConfig {
            admin_lock_hash_vec: admins.into_iter().collect(),
            script_code_hashes,
        })
}

/// Generate protocol data that passes validation.
pub fn protocol_data() -> impl Strategy<Value = ProtocolData> {
    (
        prop::collection::vec(campaign(), 0..2),
        prop::collection::vec(tipping_proposal(), 0..2),
        tipping_config(),
        prop::collection::hash_map(byte32(), endorser_info(), 0..3),
        any::<u64>(),
        protocol_config(),
    )
        .prop_map(
            |(campaigns, tipping_proposals, tipping_config, endorsers, last_updated, config)| {
                let endorsers_whitelist = endorsers
                    .into_iter()
                    .map(|(lock_hash, mut endorser)| {
                        endorser.endorser_lock_hash = lock_hash;
                        endorser
                    })
                    .collect();
                ProtocolData {
                    campaigns_approved: campaigns,
                    tipping_proposals,
                    tipping_config,
                    endorsers_whitelist,
                    last_updated,
                    protocol_config: config,
                }
            },
        )
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

pub fn user_verification() -> impl Strategy<Value = UserVerificationData> {
    (bytes(48), any::<u128>(), bytes(64)).prop_map(
        |(user_address, telegram_personal_chat_id, identity_verification_data)| {
            UserVerificationData {
                user_address,
                telegram_personal_chat_id,
                identity_verification_data,
            }
        },
    )
}

/// Generate progress with unique quest ids.
pub fn user_progress() -> impl Strategy<Value = UserProgressData> {
    (
        byte32(),
        prop::collection::btree_set(any::<u32>(), 0..5),
        any::<u32>(),
        any::<u64>(),
    )
        .prop_map(
            |(campaign_id, ids, total_points_earned, last_activity_timestamp)| UserProgressData {
                campaign_id,
                completed_quest_ids: ids.into_iter().collect(),
                total_points_earned,
                last_activity_timestamp,
            },
        )
}

pub fn user_submission() -> impl Strategy<Value = UserSubmissionRecord> {
    (byte32(), any::<u32>(), any::<u64>(), bytes(64)).prop_map(
        |(campaign_id, quest_id, submission_timestamp, submission_content)| UserSubmissionRecord {
            campaign_id,
            quest_id,
            submission_timestamp,
            submission_content,
        },
    )
}

pub fn user_data() -> impl Strategy<Value = UserData> {
    (
        user_verification(),
        any::<u32>(),
        any::<u64>(),
        prop::collection::vec(user_submission(), 0..3),
        prop::collection::vec(user_progress(), 0..3),
    )
        .prop_map(
            |(
                verification_data,
                total_points_earned,
                last_activity_timestamp,
                submission_records,
                campaign_progress,
            )| UserData {
                verification_data,
                total_points_earned,
                last_activity_timestamp,
                submission_records,
                campaign_progress,
            },
        )
}
