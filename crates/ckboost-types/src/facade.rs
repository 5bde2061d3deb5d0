//! Typed-data façade: ergonomic input to exact wire records.
//!
//! Inputs mirror what a client sends as JSON: camelCase keys, hashes as
//! `0x`-prefixed hex, text as plain strings and amounts as a string,
//! number or big integer. Every function here is pure. Errors name the
//! offending field path and the expected format.

use bytes::Bytes;
use ckboost_codec::{normalize_to_width, Byte32, Numeric, Width};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignData;
use crate::endorser::EndorserInfo;
use crate::error::{Result, ValidationError};
use crate::protocol::{ProtocolConfig, ProtocolData, ScriptCodeHashes};
use crate::script::{HashType, Script};
use crate::tipping::{TippingConfig, TippingProposalData, TippingProposalMetadata};

const BYTE32_HEX_LEN: usize = 64;

// ─────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptInput {
    pub code_hash: String,
    pub hash_type: String,
    #[serde(default)]
    pub args: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptCodeHashesInput {
    pub ckb_boost_protocol_type_code_hash: String,
    pub ckb_boost_protocol_lock_code_hash: String,
    pub ckb_boost_campaign_type_code_hash: String,
    pub ckb_boost_campaign_lock_code_hash: String,
    pub ckb_boost_user_type_code_hash: String,
    pub ckb_boost_points_udt_type_code_hash: String,
    #[serde(default)]
    pub accepted_udt_type_scripts: Vec<ScriptInput>,
    #[serde(default)]
    pub accepted_dob_type_scripts: Vec<ScriptInput>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolConfigInput {
    pub admin_lock_hash_vec: Vec<String>,
    pub script_code_hashes: ScriptCodeHashesInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndorserInfoInput {
    pub endorser_lock_hash: String,
    pub endorser_name: String,
    #[serde(default)]
    pub endorser_description: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub social_links: Vec<String>,
    #[serde(default)]
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TippingConfigInput {
    pub approval_requirement_thresholds: Vec<Numeric>,
    pub expiration_duration: Numeric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TippingProposalInput {
    pub target_address: String,
    pub proposer_lock_hash: String,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub created_at: Numeric,
    pub amount: Numeric,
    #[serde(default)]
    pub tipping_transaction_hash: Option<String>,
    #[serde(default)]
    pub approval_transaction_hash: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDataInput {
    #[serde(default)]
    pub campaigns_approved: Vec<CampaignData>,
    #[serde(default)]
    pub tipping_proposals: Vec<TippingProposalInput>,
    pub tipping_config: TippingConfigInput,
    #[serde(default)]
    pub endorsers_whitelist: Vec<EndorserInfoInput>,
    pub last_updated: Numeric,
    pub protocol_config: ProtocolConfigInput,
}

// Records back to their input form, so an editor can start from chain state.

impl From<&Script> for ScriptInput {
    fn from(script: &Script) -> Self {
        Self {
            code_hash: script.code_hash.to_string(),
            hash_type: script.hash_type.name().to_string(),
            args: format!("0x{}", hex::encode(&script.args)),
        }
    }
}

impl From<&ScriptCodeHashes> for ScriptCodeHashesInput {
    fn from(hashes: &ScriptCodeHashes) -> Self {
        Self {
            ckb_boost_protocol_type_code_hash: hashes.ckb_boost_protocol_type_code_hash.to_string(),
            ckb_boost_protocol_lock_code_hash: hashes.ckb_boost_protocol_lock_code_hash.to_string(),
            ckb_boost_campaign_type_code_hash: hashes.ckb_boost_campaign_type_code_hash.to_string(),
            ckb_boost_campaign_lock_code_hash: hashes.ckb_boost_campaign_lock_code_hash.to_string(),
            ckb_boost_user_type_code_hash: hashes.ckb_boost_user_type_code_hash.to_string(),
            ckb_boost_points_udt_type_code_hash: hashes
                .ckb_boost_points_udt_type_code_hash
                .to_string(),
            accepted_udt_type_scripts: hashes.accepted_udt_type_scripts.iter().map(Into::into).collect(),
            accepted_dob_type_scripts: hashes.accepted_dob_type_scripts.iter().map(Into::into).collect(),
        }
    }
}

impl From<&TippingConfig> for TippingConfigInput {
    fn from(config: &TippingConfig) -> Self {
        Self {
            approval_requirement_thresholds: config
                .approval_requirement_thresholds
                .iter()
                .map(|t| Numeric::from(*t))
                .collect(),
            expiration_duration: Numeric::from(config.expiration_duration),
        }
    }
}

// ─────────────────────────────────────────────────────────────
// Field parsers
// ─────────────────────────────────────────────────────────────

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Parse a 32-byte hash given as 64 hex characters, `0x` prefix optional.
pub fn parse_byte32(field: &str, input: &str) -> Result<Byte32> {
    let hex_part = strip_hex_prefix(input.trim());
    if hex_part.len() != BYTE32_HEX_LEN {
        return Err(ValidationError::new(
            field,
            format!(
                "Invalid hex string length for Byte32: expected {} hex characters, got {}",
                BYTE32_HEX_LEN,
                hex_part.len()
            ),
        ));
    }
    Byte32::from_hex(hex_part).map_err(|e| {
        ValidationError::new(field, format!("Invalid hex string for Byte32: {}", e))
    })
}

/// Parse a `0x`-prefixed hex byte string. `""` and `"0x"` are empty.
pub fn parse_hex_bytes(field: &str, input: &str) -> Result<Bytes> {
    let hex_part = strip_hex_prefix(input.trim());
    hex::decode(hex_part)
        .map(Bytes::from)
        .map_err(|e| ValidationError::new(field, format!("Invalid hex byte string: {}", e)))
}

/// Parse a hash type by name (`data`, `type`, `data1`, `data2`) or raw byte.
pub fn parse_hash_type(field: &str, input: &str) -> Result<HashType> {
    let trimmed = input.trim();
    HashType::from_name(&trimmed.to_ascii_lowercase())
        .or_else(|| trimmed.parse::<u8>().ok().and_then(HashType::from_u8))
        .ok_or_else(|| {
            ValidationError::new(
                field,
                format!(
                    "Invalid hash type {:?}: expected one of data, type, data1, data2",
                    input
                ),
            )
        })
}

fn utf8(text: &str) -> Bytes {
    Bytes::copy_from_slice(text.as_bytes())
}

fn uint(field: &str, input: &Numeric, width: Width) -> Result<ckboost_codec::Uint256> {
    normalize_to_width(input, width).map_err(|e| ValidationError::numeric(field, e))
}

fn uint64(field: &str, input: &Numeric) -> Result<u64> {
    uint(field, input, Width::U64)?
        .to_u64()
        .map_err(|e| ValidationError::numeric(field, e))
}

fn uint128(field: &str, input: &Numeric) -> Result<u128> {
    uint(field, input, Width::U128)?
        .to_u128()
        .map_err(|e| ValidationError::numeric(field, e))
}

fn byte32_list(field: &str, inputs: &[String]) -> Result<Vec<Byte32>> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, s)| parse_byte32(&format!("{}[{}]", field, i), s))
        .collect()
}

fn script_at(field: &str, input: &ScriptInput) -> Result<Script> {
    Ok(Script {
        code_hash: parse_byte32(&format!("{}.codeHash", field), &input.code_hash)?,
        hash_type: parse_hash_type(&format!("{}.hashType", field), &input.hash_type)?,
        args: parse_hex_bytes(&format!("{}.args", field), &input.args)?,
    })
}

fn script_list(field: &str, inputs: &[ScriptInput]) -> Result<Vec<Script>> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, s)| script_at(&format!("{}[{}]", field, i), s))
        .collect()
}

fn prefixed(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}.{}", parent, child)
    }
}

// ─────────────────────────────────────────────────────────────
// Constructors
// ─────────────────────────────────────────────────────────────

pub fn create_script(input: &ScriptInput) -> Result<Script> {
    script_at("script", input)
}

fn script_code_hashes_at(field: &str, input: &ScriptCodeHashesInput) -> Result<ScriptCodeHashes> {
    let hash = |name: &str, value: &str| parse_byte32(&prefixed(field, name), value);
    Ok(ScriptCodeHashes {
        ckb_boost_protocol_type_code_hash: hash(
            "ckbBoostProtocolTypeCodeHash",
            &input.ckb_boost_protocol_type_code_hash,
        )?,
        ckb_boost_protocol_lock_code_hash: hash(
            "ckbBoostProtocolLockCodeHash",
            &input.ckb_boost_protocol_lock_code_hash,
        )?,
        ckb_boost_campaign_type_code_hash: hash(
            "ckbBoostCampaignTypeCodeHash",
            &input.ckb_boost_campaign_type_code_hash,
        )?,
        ckb_boost_campaign_lock_code_hash: hash(
            "ckbBoostCampaignLockCodeHash",
            &input.ckb_boost_campaign_lock_code_hash,
        )?,
        ckb_boost_user_type_code_hash: hash(
            "ckbBoostUserTypeCodeHash",
            &input.ckb_boost_user_type_code_hash,
        )?,
        ckb_boost_points_udt_type_code_hash: hash(
            "ckbBoostPointsUdtTypeCodeHash",
            &input.ckb_boost_points_udt_type_code_hash,
        )?,
        accepted_udt_type_scripts: script_list(
            &prefixed(field, "acceptedUdtTypeScripts"),
            &input.accepted_udt_type_scripts,
        )?,
        accepted_dob_type_scripts: script_list(
            &prefixed(field, "acceptedDobTypeScripts"),
            &input.accepted_dob_type_scripts,
        )?,
    })
}

pub fn create_script_code_hashes(input: &ScriptCodeHashesInput) -> Result<ScriptCodeHashes> {
    script_code_hashes_at("", input)
}

fn protocol_config_at(field: &str, input: &ProtocolConfigInput) -> Result<ProtocolConfig> {
    Ok(ProtocolConfig {
        admin_lock_hash_vec: byte32_list(
            &prefixed(field, "adminLockHashVec"),
            &input.admin_lock_hash_vec,
        )?,
        script_code_hashes: script_code_hashes_at(
            &prefixed(field, "scriptCodeHashes"),
            &input.script_code_hashes,
        )?,
    })
}

pub fn create_protocol_config(input: &ProtocolConfigInput) -> Result<ProtocolConfig> {
    protocol_config_at("", input)
}

fn endorser_info_at(field: &str, input: &EndorserInfoInput) -> Result<EndorserInfo> {
    Ok(EndorserInfo {
        endorser_lock_hash: parse_byte32(
            &prefixed(field, "endorserLockHash"),
            &input.endorser_lock_hash,
        )?,
        endorser_name: utf8(&input.endorser_name),
        endorser_description: utf8(&input.endorser_description),
        website: utf8(input.website.as_deref().unwrap_or("")),
        social_links: input.social_links.iter().map(|s| utf8(s)).collect(),
        verified: u8::from(input.verified.unwrap_or(false)),
    })
}

/// Build an endorser. Missing optional text encodes as an empty string.
pub fn create_endorser_info(input: &EndorserInfoInput) -> Result<EndorserInfo> {
    endorser_info_at("", input)
}

fn tipping_config_at(field: &str, input: &TippingConfigInput) -> Result<TippingConfig> {
    let thresholds_field = prefixed(field, "approvalRequirementThresholds");
    let approval_requirement_thresholds = input
        .approval_requirement_thresholds
        .iter()
        .enumerate()
        .map(|(i, n)| uint128(&format!("{}[{}]", thresholds_field, i), n))
        .collect::<Result<Vec<_>>>()?;
    Ok(TippingConfig {
        approval_requirement_thresholds,
        expiration_duration: uint64(
            &prefixed(field, "expirationDuration"),
            &input.expiration_duration,
        )?,
    })
}

/// Build a tipping config, normalizing every threshold to 128 bits.
pub fn create_tipping_config(input: &TippingConfigInput) -> Result<TippingConfig> {
    tipping_config_at("", input)
}

fn tipping_proposal_at(field: &str, input: &TippingProposalInput) -> Result<TippingProposalData> {
    let tipping_transaction_hash = input
        .tipping_transaction_hash
        .as_deref()
        .map(|h| parse_byte32(&prefixed(field, "tippingTransactionHash"), h))
        .transpose()?;
    Ok(TippingProposalData {
        target_address: utf8(&input.target_address),
        proposer_lock_hash: parse_byte32(
            &prefixed(field, "proposerLockHash"),
            &input.proposer_lock_hash,
        )?,
        metadata: TippingProposalMetadata {
            title: utf8(&input.title),
            tags: input.tags.iter().map(|s| utf8(s)).collect(),
            description: utf8(&input.description),
            created_at: uint64(&prefixed(field, "createdAt"), &input.created_at)?,
        },
        amount: uint64(&prefixed(field, "amount"), &input.amount)?,
        tipping_transaction_hash,
        approval_transaction_hash: byte32_list(
            &prefixed(field, "approvalTransactionHash"),
            &input.approval_transaction_hash,
        )?,
    })
}

pub fn create_tipping_proposal(input: &TippingProposalInput) -> Result<TippingProposalData> {
    tipping_proposal_at("", input)
}

/// Build the full protocol record from client input.
pub fn create_protocol_data(input: &ProtocolDataInput) -> Result<ProtocolData> {
    let tipping_proposals = input
        .tipping_proposals
        .iter()
        .enumerate()
        .map(|(i, p)| tipping_proposal_at(&format!("tippingProposals[{}]", i), p))
        .collect::<Result<Vec<_>>>()?;
    let endorsers_whitelist = input
        .endorsers_whitelist
        .iter()
        .enumerate()
        .map(|(i, e)| endorser_info_at(&format!("endorsersWhitelist[{}]", i), e))
        .collect::<Result<Vec<_>>>()?;
    Ok(ProtocolData {
        campaigns_approved: input.campaigns_approved.clone(),
        tipping_proposals,
        tipping_config: tipping_config_at("tippingConfig", &input.tipping_config)?,
        endorsers_whitelist,
        last_updated: uint64("lastUpdated", &input.last_updated)?,
        protocol_config: protocol_config_at("protocolConfig", &input.protocol_config)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn hash(byte: char) -> String {
        format!("0x{}", byte.to_string().repeat(64))
    }

    fn code_hashes_input() -> ScriptCodeHashesInput {
        ScriptCodeHashesInput {
            ckb_boost_protocol_type_code_hash: hash('1'),
            ckb_boost_protocol_lock_code_hash: hash('2'),
            ckb_boost_campaign_type_code_hash: hash('3'),
            ckb_boost_campaign_lock_code_hash: hash('4'),
            ckb_boost_user_type_code_hash: hash('5'),
            ckb_boost_points_udt_type_code_hash: hash('0'),
            accepted_udt_type_scripts: vec![ScriptInput {
                code_hash: hash('a'),
                hash_type: "type".into(),
                args: "0x01".into(),
            }],
            accepted_dob_type_scripts: Vec::new(),
        }
    }

    fn protocol_input() -> ProtocolDataInput {
        ProtocolDataInput {
            campaigns_approved: Vec::new(),
            tipping_proposals: Vec::new(),
            tipping_config: TippingConfigInput {
                approval_requirement_thresholds: vec![
                    Numeric::from("100000000000"),
                    Numeric::from(500000000000u64),
                ],
                expiration_duration: Numeric::from(2592000u64),
            },
            endorsers_whitelist: vec![EndorserInfoInput {
                endorser_lock_hash: hash('e'),
                endorser_name: "Alice".into(),
                endorser_description: String::new(),
                website: None,
                social_links: vec!["https://x.com/alice".into()],
                verified: Some(true),
            }],
            last_updated: Numeric::from(1u64),
            protocol_config: ProtocolConfigInput {
                admin_lock_hash_vec: vec![hash('f')],
                script_code_hashes: code_hashes_input(),
            },
        }
    }

    #[test]
    fn test_parse_byte32_accepts_prefix_and_bare() {
        let a = parse_byte32("h", &hash('a')).unwrap();
        let b = parse_byte32("h", &"a".repeat(64)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_bytes(), &[0xaa; 32]);
    }

    #[test]
    fn test_short_admin_hash_mentions_byte32() {
        let mut input = protocol_input();
        input.protocol_config.admin_lock_hash_vec = vec![format!("0x{}", "f".repeat(63))];
        let err = create_protocol_data(&input).unwrap_err();
        assert_eq!(err.field, "protocolConfig.adminLockHashVec[0]");
        assert!(err.message.contains("Byte32"));
        assert!(err.message.contains("got 63"));
    }

    #[test]
    fn test_non_hex_hash_rejected() {
        let err = parse_byte32("h", &format!("0x{}", "g".repeat(64))).unwrap_err();
        assert!(err.message.contains("Byte32"));
    }

    #[test]
    fn test_parse_hash_type() {
        assert_eq!(parse_hash_type("t", "type").unwrap(), HashType::Type);
        assert_eq!(parse_hash_type("t", "Data1").unwrap(), HashType::Data1);
        assert_eq!(parse_hash_type("t", "4").unwrap(), HashType::Data2);
        assert!(parse_hash_type("t", "3").is_err());
    }

    #[test]
    fn test_parse_hex_bytes() {
        assert!(parse_hex_bytes("a", "0x").unwrap().is_empty());
        assert!(parse_hex_bytes("a", "").unwrap().is_empty());
        assert_eq!(parse_hex_bytes("a", "0xdead").unwrap().as_ref(), &[0xde, 0xad]);
        assert!(parse_hex_bytes("a", "0xabc").is_err());
    }

    #[test]
    fn test_endorser_empty_optionals_are_empty_strings() {
        let endorser = create_endorser_info(&EndorserInfoInput {
            endorser_lock_hash: hash('1'),
            endorser_name: "Bob".into(),
            endorser_description: String::new(),
            website: None,
            social_links: Vec::new(),
            verified: None,
        })
        .unwrap();
        assert!(endorser.website.is_empty());
        assert!(endorser.endorser_description.is_empty());
        assert_eq!(endorser.verified, 0);
        let bytes = endorser.encode().unwrap();
        assert_eq!(EndorserInfo::decode(&bytes).unwrap(), endorser);
    }

    #[test]
    fn test_tipping_config_normalizes_every_representation() {
        let config = create_tipping_config(&TippingConfigInput {
            approval_requirement_thresholds: vec![
                Numeric::from("100000000000"),
                Numeric::from("100000000000n"),
                Numeric::from(100000000000u64),
                Numeric::from(100000000000u128),
            ],
            expiration_duration: Numeric::from("2592000"),
        })
        .unwrap();
        assert!(config
            .approval_requirement_thresholds
            .iter()
            .all(|t| *t == 100000000000));
        assert_eq!(config.expiration_duration, 2592000);
    }

    #[test]
    fn test_tipping_config_rejects_negative_and_too_wide() {
        let negative = create_tipping_config(&TippingConfigInput {
            approval_requirement_thresholds: vec![Numeric::from(-1i64)],
            expiration_duration: Numeric::from(1u64),
        })
        .unwrap_err();
        assert_eq!(negative.field, "approvalRequirementThresholds[0]");

        let too_wide = create_tipping_config(&TippingConfigInput {
            approval_requirement_thresholds: Vec::new(),
            expiration_duration: Numeric::from(u128::from(u64::MAX) + 1),
        })
        .unwrap_err();
        assert_eq!(too_wide.field, "expirationDuration");
    }

    #[test]
    fn test_create_protocol_data_roundtrip() {
        let data = create_protocol_data(&protocol_input()).unwrap();
        assert_eq!(data.protocol_config.admin_lock_hash_vec.len(), 1);
        assert!(data.protocol_config.script_code_hashes.ckb_boost_points_udt_type_code_hash.is_zero());
        let bytes = data.encode().unwrap();
        assert_eq!(ProtocolData::decode(&bytes).unwrap(), data);
    }

    #[test]
    fn test_protocol_input_from_json() {
        let json = serde_json::json!({
            "tippingConfig": {
                "approvalRequirementThresholds": ["100000000000", 500000000000u64],
                "expirationDuration": 2592000
            },
            "lastUpdated": "1",
            "protocolConfig": {
                "adminLockHashVec": [hash('f')],
                "scriptCodeHashes": serde_json::to_value(code_hashes_input()).unwrap()
            }
        });
        let input: ProtocolDataInput = serde_json::from_value(json).unwrap();
        let data = create_protocol_data(&input).unwrap();
        assert_eq!(
            data.tipping_config.approval_requirement_thresholds,
            vec![100000000000, 500000000000]
        );
    }

    #[test]
    fn test_inputs_from_records_rebuild_the_same_records() {
        let hashes = create_script_code_hashes(&code_hashes_input()).unwrap();
        let again = create_script_code_hashes(&ScriptCodeHashesInput::from(&hashes)).unwrap();
        assert_eq!(again, hashes);

        let config = TippingConfig {
            approval_requirement_thresholds: vec![u128::MAX, 0],
            expiration_duration: 7,
        };
        let again = create_tipping_config(&TippingConfigInput::from(&config)).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_create_tipping_proposal() {
        let proposal = create_tipping_proposal(&TippingProposalInput {
            target_address: "ckt1qyq".into(),
            proposer_lock_hash: hash('2'),
            title: "Thanks".into(),
            tags: vec!["community".into()],
            description: String::new(),
            created_at: Numeric::from(1700000000u64),
            amount: Numeric::from("10000000000"),
            tipping_transaction_hash: None,
            approval_transaction_hash: vec![hash('3')],
        })
        .unwrap();
        assert!(!proposal.is_executed());
        assert_eq!(proposal.amount, 10000000000);
        assert_eq!(proposal.metadata.tags[0].as_ref(), b"community");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn byte32_hex_roundtrip(raw in any::<[u8; 32]>()) {
                let hash = Byte32::from_bytes(raw);
                prop_assert_eq!(parse_byte32("h", &hash.to_hex()).unwrap(), hash);
                prop_assert_eq!(parse_byte32("h", &hash.to_string()).unwrap(), hash);
            }

            #[test]
            fn wrong_length_hash_always_names_byte32(len in 0usize..128) {
                prop_assume!(len != 64);
                let err = parse_byte32("h", &"a".repeat(len)).unwrap_err();
                prop_assert!(err.message.contains("Byte32"));
            }
        }
    }
}
