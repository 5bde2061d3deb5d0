//! Funding and reward asset records.

use ckboost_codec::{CodecError, Value};
use serde::{Deserialize, Serialize};

use crate::record::{records, Record};
use crate::registry::names;
use crate::script::Script;

/// An amount of a user-defined token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UdtFunding {
    pub udt_script: Script,
    #[serde(with = "u128_string")]
    pub amount: u128,
}

impl Record for UdtFunding {
    const SCHEMA: &'static str = names::UDT_FUNDING;

    fn to_value(&self) -> Value {
        Value::record(vec![self.udt_script.to_value(), Value::uint(self.amount)])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let udt_script = f.record(Script::from_value)?;
        let amount = f.u128()?;
        f.finish()?;
        Ok(Self { udt_script, amount })
    }
}

/// A bundle of CKB, NFTs and UDT amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetList {
    pub ckb_amount: u64,
    pub nft_assets: Vec<Script>,
    pub udt_assets: Vec<UdtFunding>,
}

impl AssetList {
    pub fn is_empty(&self) -> bool {
        self.ckb_amount == 0 && self.nft_assets.is_empty() && self.udt_assets.is_empty()
    }
}

impl Record for AssetList {
    const SCHEMA: &'static str = names::ASSET_LIST;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::uint(self.ckb_amount),
            records(&self.nft_assets),
            records(&self.udt_assets),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let ckb_amount = f.u64()?;
        let nft_assets = f.vector(Script::from_value)?;
        let udt_assets = f.vector(UdtFunding::from_value)?;
        f.finish()?;
        Ok(Self {
            ckb_amount,
            nft_assets,
            udt_assets,
        })
    }
}

/// JSON cannot carry 128-bit integers losslessly; use decimal strings.
pub(crate) mod u128_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::HashType;
    use ckboost_codec::Byte32;

    #[test]
    fn test_asset_list_roundtrip() {
        let udt = Script::new(Byte32::from_bytes([8; 32]), HashType::Type, vec![0x01]);
        let list = AssetList {
            ckb_amount: 500_00000000,
            nft_assets: vec![udt.clone()],
            udt_assets: vec![UdtFunding {
                udt_script: udt,
                amount: u128::MAX,
            }],
        };
        let bytes = list.encode().unwrap();
        assert_eq!(AssetList::decode(&bytes).unwrap(), list);
    }

    #[test]
    fn test_empty_asset_list() {
        let list = AssetList::default();
        assert!(list.is_empty());
        let bytes = list.encode().unwrap();
        assert_eq!(AssetList::decode(&bytes).unwrap(), list);
    }

    #[test]
    fn test_udt_amount_serializes_as_string() {
        let funding = UdtFunding {
            udt_script: Script::new(Byte32::ZERO, HashType::Data, Vec::new()),
            amount: 340282366920938463463374607431768211455,
        };
        let json = serde_json::to_string(&funding).unwrap();
        assert!(json.contains("\"340282366920938463463374607431768211455\""));
        let back: UdtFunding = serde_json::from_str(&json).unwrap();
        assert_eq!(back, funding);
    }
}
