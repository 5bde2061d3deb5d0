//! Tipping configuration and proposals.

use bytes::Bytes;
use ckboost_codec::{hex_bytes, hex_bytes_vec, Byte32, CodecError, Value};
use serde::{Deserialize, Serialize};

use crate::assets::u128_string;
use crate::error::ValidationError;
use crate::record::{byte_strings, hashes, Record};
use crate::registry::names;

/// Approval thresholds and proposal lifetime.
///
/// Threshold order is significant: entry `i` is the number of approvals
/// required for the `i`-th amount tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TippingConfig {
    #[serde(with = "u128_vec_string")]
    pub approval_requirement_thresholds: Vec<u128>,
    pub expiration_duration: u64,
}

impl Record for TippingConfig {
    const SCHEMA: &'static str = names::TIPPING_CONFIG;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::vector(self.approval_requirement_thresholds.iter().copied().map(Value::uint)),
            Value::uint(self.expiration_duration),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let approval_requirement_thresholds =
            f.vector(|v| v.into_u128("TippingConfig.approval_requirement_thresholds"))?;
        let expiration_duration = f.u64()?;
        f.finish()?;
        Ok(Self {
            approval_requirement_thresholds,
            expiration_duration,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TippingProposalMetadata {
    #[serde(with = "hex_bytes")]
    pub title: Bytes,
    #[serde(with = "hex_bytes_vec")]
    pub tags: Vec<Bytes>,
    #[serde(with = "hex_bytes")]
    pub description: Bytes,
    pub created_at: u64,
}

impl Record for TippingProposalMetadata {
    const SCHEMA: &'static str = names::TIPPING_PROPOSAL_METADATA;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::bytes(self.title.clone()),
            byte_strings(&self.tags),
            Value::bytes(self.description.clone()),
            Value::uint(self.created_at),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let title = f.bytes()?;
        let tags = f.vector(|v| v.into_bytes("TippingProposalMetadata.tags"))?;
        let description = f.bytes()?;
        let created_at = f.u64()?;
        f.finish()?;
        Ok(Self {
            title,
            tags,
            description,
            created_at,
        })
    }
}

/// A proposal to tip an address, collecting approvals until executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TippingProposalData {
    #[serde(with = "hex_bytes")]
    pub target_address: Bytes,
    pub proposer_lock_hash: Byte32,
    pub metadata: TippingProposalMetadata,
    pub amount: u64,
    pub tipping_transaction_hash: Option<Byte32>,
    pub approval_transaction_hash: Vec<Byte32>,
}

impl TippingProposalData {
    /// A proposal is executed once its tipping transaction is recorded.
    pub fn is_executed(&self) -> bool {
        self.tipping_transaction_hash.is_some()
    }

    /// Record the executing transaction. Fails if already executed.
    pub fn mark_executed(&mut self, tx_hash: Byte32) -> Result<(), ValidationError> {
        if let Some(existing) = self.tipping_transaction_hash {
            return Err(ValidationError::new(
                "tipping_transaction_hash",
                format!("proposal already executed by {}", existing),
            ));
        }
        self.tipping_transaction_hash = Some(tx_hash);
        Ok(())
    }

    pub fn approval_count(&self) -> usize {
        self.approval_transaction_hash.len()
    }

    /// Whether the proposal has outlived `expiration_duration` at `now`.
    pub fn is_expired(&self, config: &TippingConfig, now: u64) -> bool {
        now > self
            .metadata
            .created_at
            .saturating_add(config.expiration_duration)
    }
}

impl Record for TippingProposalData {
    const SCHEMA: &'static str = names::TIPPING_PROPOSAL_DATA;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::bytes(self.target_address.clone()),
            Value::byte32(&self.proposer_lock_hash),
            self.metadata.to_value(),
            Value::uint(self.amount),
            Value::option(self.tipping_transaction_hash.as_ref().map(Value::byte32)),
            hashes(&self.approval_transaction_hash),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let target_address = f.bytes()?;
        let proposer_lock_hash = f.byte32()?;
        let metadata = f.record(TippingProposalMetadata::from_value)?;
        let amount = f.u64()?;
        let tipping_transaction_hash =
            f.option(|v| v.into_byte32("TippingProposalData.tipping_transaction_hash"))?;
        let approval_transaction_hash =
            f.vector(|v| v.into_byte32("TippingProposalData.approval_transaction_hash"))?;
        f.finish()?;
        Ok(Self {
            target_address,
            proposer_lock_hash,
            metadata,
            amount,
            tipping_transaction_hash,
            approval_transaction_hash,
        })
    }
}

mod u128_vec_string {
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[u128], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&value.to_string())?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u128>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|s| s.parse().map_err(serde::de::Error::custom))
            .collect()
    }
}
