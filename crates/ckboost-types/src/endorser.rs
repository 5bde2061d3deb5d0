//! Endorser records.

use bytes::Bytes;
use ckboost_codec::{hex_bytes, hex_bytes_vec, Byte32, CodecError, Value};
use serde::{Deserialize, Serialize};

use crate::record::{byte_strings, Record};
use crate::registry::names;

/// A whitelisted endorser. Identity is the lock hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndorserInfo {
    pub endorser_lock_hash: Byte32,
    #[serde(with = "hex_bytes")]
    pub endorser_name: Bytes,
    #[serde(with = "hex_bytes")]
    pub endorser_description: Bytes,
    #[serde(with = "hex_bytes")]
    pub website: Bytes,
    #[serde(with = "hex_bytes_vec")]
    pub social_links: Vec<Bytes>,
    pub verified: u8,
}

impl EndorserInfo {
    pub fn is_verified(&self) -> bool {
        self.verified != 0
    }

    /// Name as UTF-8, replacing invalid sequences.
    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.endorser_name).into_owned()
    }
}

impl Record for EndorserInfo {
    const SCHEMA: &'static str = names::ENDORSER_INFO;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::byte32(&self.endorser_lock_hash),
            Value::bytes(self.endorser_name.clone()),
            Value::bytes(self.endorser_description.clone()),
            Value::bytes(self.website.clone()),
            byte_strings(&self.social_links),
            Value::uint(self.verified),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let endorser_lock_hash = f.byte32()?;
        let endorser_name = f.bytes()?;
        let endorser_description = f.bytes()?;
        let website = f.bytes()?;
        let social_links = f.vector(|v| v.into_bytes("EndorserInfo.social_links"))?;
        let verified = f.u8()?;
        f.finish()?;
        Ok(Self {
            endorser_lock_hash,
            endorser_name,
            endorser_description,
            website,
            social_links,
            verified,
        })
    }
}
