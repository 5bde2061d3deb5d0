//! The root protocol cell and its configuration.

use std::collections::HashSet;

use ckboost_codec::{Byte32, CodecError, Value};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignData;
use crate::endorser::EndorserInfo;
use crate::error::ValidationError;
use crate::record::{hashes, records, Record};
use crate::registry::names;
use crate::script::Script;
use crate::tipping::{TippingConfig, TippingProposalData};

/// Code hashes of the contracts the protocol depends on.
///
/// A zero hash marks a contract that is not deployed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCodeHashes {
    pub ckb_boost_protocol_type_code_hash: Byte32,
    pub ckb_boost_protocol_lock_code_hash: Byte32,
    pub ckb_boost_campaign_type_code_hash: Byte32,
    pub ckb_boost_campaign_lock_code_hash: Byte32,
    pub ckb_boost_user_type_code_hash: Byte32,
    pub ckb_boost_points_udt_type_code_hash: Byte32,
    pub accepted_udt_type_scripts: Vec<Script>,
    pub accepted_dob_type_scripts: Vec<Script>,
}

impl ScriptCodeHashes {
    /// The six fixed hashes with their field names, in layout order.
    pub fn fixed_hashes(&self) -> [(&'static str, &Byte32); 6] {
        [
            ("ckb_boost_protocol_type_code_hash", &self.ckb_boost_protocol_type_code_hash),
            ("ckb_boost_protocol_lock_code_hash", &self.ckb_boost_protocol_lock_code_hash),
            ("ckb_boost_campaign_type_code_hash", &self.ckb_boost_campaign_type_code_hash),
            ("ckb_boost_campaign_lock_code_hash", &self.ckb_boost_campaign_lock_code_hash),
            ("ckb_boost_user_type_code_hash", &self.ckb_boost_user_type_code_hash),
            ("ckb_boost_points_udt_type_code_hash", &self.ckb_boost_points_udt_type_code_hash),
        ]
    }
}

impl Record for ScriptCodeHashes {
    const SCHEMA: &'static str = names::SCRIPT_CODE_HASHES;

    fn to_value(&self) -> Value {
        let mut fields: Vec<Value> = self
            .fixed_hashes()
            .iter()
            .map(|(_, hash)| Value::byte32(hash))
            .collect();
        fields.push(records(&self.accepted_udt_type_scripts));
        fields.push(records(&self.accepted_dob_type_scripts));
        Value::record(fields)
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let out = Self {
            ckb_boost_protocol_type_code_hash: f.byte32()?,
            ckb_boost_protocol_lock_code_hash: f.byte32()?,
            ckb_boost_campaign_type_code_hash: f.byte32()?,
            ckb_boost_campaign_lock_code_hash: f.byte32()?,
            ckb_boost_user_type_code_hash: f.byte32()?,
            ckb_boost_points_udt_type_code_hash: f.byte32()?,
            accepted_udt_type_scripts: f.vector(Script::from_value)?,
            accepted_dob_type_scripts: f.vector(Script::from_value)?,
        };
        f.finish()?;
        Ok(out)
    }
}

/// Admins plus the script registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub admin_lock_hash_vec: Vec<Byte32>,
    pub script_code_hashes: ScriptCodeHashes,
}

impl ProtocolConfig {
    /// The protocol can only be updated while it has an admin.
    pub fn is_governable(&self) -> bool {
        !self.admin_lock_hash_vec.is_empty()
    }

    pub fn is_admin(&self, lock_hash: &Byte32) -> bool {
        self.admin_lock_hash_vec.contains(lock_hash)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.is_governable() {
            return Err(ValidationError::new(
                "protocol_config.admin_lock_hash_vec",
                "at least one admin lock hash is required",
            ));
        }
        Ok(())
    }
}

impl Record for ProtocolConfig {
    const SCHEMA: &'static str = names::PROTOCOL_CONFIG;

    fn to_value(&self) -> Value {
        Value::record(vec![
            hashes(&self.admin_lock_hash_vec),
            self.script_code_hashes.to_value(),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let admin_lock_hash_vec = f.vector(|v| v.into_byte32("ProtocolConfig.admin_lock_hash_vec"))?;
        let script_code_hashes = f.record(ScriptCodeHashes::from_value)?;
        f.finish()?;
        Ok(Self {
            admin_lock_hash_vec,
            script_code_hashes,
        })
    }
}

/// State of the protocol cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolData {
    pub campaigns_approved: Vec<CampaignData>,
    pub tipping_proposals: Vec<TippingProposalData>,
    pub tipping_config: TippingConfig,
    pub endorsers_whitelist: Vec<EndorserInfo>,
    pub last_updated: u64,
    pub protocol_config: ProtocolConfig,
}

impl ProtocolData {
    pub fn endorser(&self, lock_hash: &Byte32) -> Option<&EndorserInfo> {
        self.endorsers_whitelist
            .iter()
            .find(|e| &e.endorser_lock_hash == lock_hash)
    }

    /// Check every invariant the protocol cell carries.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.protocol_config.validate()?;

        let mut seen = HashSet::new();
        for (i, endorser) in self.endorsers_whitelist.iter().enumerate() {
            if !seen.insert(endorser.endorser_lock_hash) {
                return Err(ValidationError::new(
                    format!("endorsers_whitelist[{}].endorser_lock_hash", i),
                    format!("duplicate endorser {}", endorser.endorser_lock_hash),
                ));
            }
        }

        for (i, campaign) in self.campaigns_approved.iter().enumerate() {
            campaign
                .validate()
                .map_err(|e| e.within(&format!("campaigns_approved[{}]", i)))?;
        }
        Ok(())
    }

    /// Check that `next` may replace `self` on chain.
    pub fn check_successor(&self, next: &ProtocolData) -> Result<(), ValidationError> {
        if next.last_updated <= self.last_updated {
            return Err(ValidationError::new(
                "last_updated",
                format!(
                    "must increase: {} is not after {}",
                    next.last_updated, self.last_updated
                ),
            ));
        }
        next.validate()
    }
}

impl Record for ProtocolData {
    const SCHEMA: &'static str = names::PROTOCOL_DATA;

    fn to_value(&self) -> Value {
        Value::record(vec![
            records(&self.campaigns_approved),
            records(&self.tipping_proposals),
            self.tipping_config.to_value(),
            records(&self.endorsers_whitelist),
            Value::uint(self.last_updated),
            self.protocol_config.to_value(),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let campaigns_approved = f.vector(CampaignData::from_value)?;
        let tipping_proposals = f.vector(TippingProposalData::from_value)?;
        let tipping_config = f.record(TippingConfig::from_value)?;
        let endorsers_whitelist = f.vector(EndorserInfo::from_value)?;
        let last_updated = f.u64()?;
        let protocol_config = f.record(ProtocolConfig::from_value)?;
        f.finish()?;
        Ok(Self {
            campaigns_approved,
            tipping_proposals,
            tipping_config,
            endorsers_whitelist,
            last_updated,
            protocol_config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::HashType;
    use bytes::Bytes;

    fn endorser(byte: u8) -> EndorserInfo {
        EndorserInfo {
            endorser_lock_hash: Byte32::from_bytes([byte; 32]),
            endorser_name: Bytes::from_static(b"e"),
            endorser_description: Bytes::new(),
            website: Bytes::new(),
            social_links: Vec::new(),
            verified: 0,
        }
    }

    fn sample() -> ProtocolData {
        ProtocolData {
            campaigns_approved: Vec::new(),
            tipping_proposals: Vec::new(),
            tipping_config: TippingConfig {
                approval_requirement_thresholds: vec![100000000000],
                expiration_duration: 2592000,
            },
            endorsers_whitelist: vec![endorser(1)],
            last_updated: 10,
            protocol_config: ProtocolConfig {
                admin_lock_hash_vec: vec![Byte32::from_bytes([0xaa; 32])],
                script_code_hashes: ScriptCodeHashes {
                    accepted_udt_type_scripts: vec![Script::new(
                        Byte32::from_bytes([5; 32]),
                        HashType::Type,
                        vec![1],
                    )],
                    ..Default::default()
                },
            },
        }
    }

    #[test]
    fn test_protocol_data_roundtrip() {
        let data = sample();
        let bytes = data.encode().unwrap();
        assert_eq!(ProtocolData::decode(&bytes).unwrap(), data);
    }

    #[test]
    fn test_default_protocol_data_roundtrip() {
        let data = ProtocolData::default();
        let bytes = data.encode().unwrap();
        assert_eq!(ProtocolData::decode(&bytes).unwrap(), data);
    }

    #[test]
    fn test_validate_requires_admin() {
        let mut data = sample();
        assert!(data.validate().is_ok());
        data.protocol_config.admin_lock_hash_vec.clear();
        let err = data.validate().unwrap_err();
        assert_eq!(err.field, "protocol_config.admin_lock_hash_vec");
    }

    #[test]
    fn test_validate_rejects_duplicate_endorser() {
        let mut data = sample();
        data.endorsers_whitelist.push(endorser(1));
        let err = data.validate().unwrap_err();
        assert_eq!(err.field, "endorsers_whitelist[1].endorser_lock_hash");
    }

    #[test]
    fn test_successor_must_advance_timestamp() {
        let data = sample();
        let mut next = data.clone();
        assert!(data.check_successor(&next).is_err());
        next.last_updated = 11;
        assert!(data.check_successor(&next).is_ok());
    }

    #[test]
    fn test_truncated_protocol_data_fails() {
        let bytes = sample().encode().unwrap();
        let err = ProtocolData::decode(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(err.is_layout());
    }
}
