//! Campaign records.

use bytes::Bytes;
use ckboost_codec::{hex_bytes, hex_bytes_vec, Byte32, CodecError, Value};
use serde::{Deserialize, Serialize};

use crate::assets::AssetList;
use crate::endorser::EndorserInfo;
use crate::error::ValidationError;
use crate::quest::QuestData;
use crate::record::{byte_strings, records, Record};
use crate::registry::names;
use crate::script::Script;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignMetadata {
    pub funding_info: Vec<AssetList>,
    pub created_at: u64,
    pub starting_time: u64,
    pub ending_time: u64,
    pub verification_requirements: u32,
    pub last_updated: u64,
    #[serde(with = "hex_bytes_vec")]
    pub categories: Vec<Bytes>,
    pub difficulty: u8,
    #[serde(with = "hex_bytes")]
    pub image_url: Bytes,
    #[serde(with = "hex_bytes_vec")]
    pub rules: Vec<Bytes>,
}

impl CampaignMetadata {
    pub fn is_active_at(&self, now: u64) -> bool {
        self.starting_time <= now && now <= self.ending_time
    }
}

impl Record for CampaignMetadata {
    const SCHEMA: &'static str = names::CAMPAIGN_METADATA;

    fn to_value(&self) -> Value {
        Value::record(vec![
            records(&self.funding_info),
            Value::uint(self.created_at),
            Value::uint(self.starting_time),
            Value::uint(self.ending_time),
            Value::uint(self.verification_requirements),
            Value::uint(self.last_updated),
            byte_strings(&self.categories),
            Value::uint(self.difficulty),
            Value::bytes(self.image_url.clone()),
            byte_strings(&self.rules),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let out = Self {
            funding_info: f.vector(AssetList::from_value)?,
            created_at: f.u64()?,
            starting_time: f.u64()?,
            ending_time: f.u64()?,
            verification_requirements: f.u32()?,
            last_updated: f.u64()?,
            categories: f.vector(|v| v.into_bytes("CampaignMetadata.categories"))?,
            difficulty: f.u8()?,
            image_url: f.bytes()?,
            rules: f.vector(|v| v.into_bytes("CampaignMetadata.rules"))?,
        };
        f.finish()?;
        Ok(out)
    }
}

/// State of a campaign cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignData {
    pub id: Byte32,
    pub creator: Script,
    pub metadata: CampaignMetadata,
    pub status: u8,
    /// Display order only.
    pub quests: Vec<QuestData>,
    #[serde(with = "hex_bytes")]
    pub title: Bytes,
    #[serde(with = "hex_bytes")]
    pub short_description: Bytes,
    #[serde(with = "hex_bytes")]
    pub long_description: Bytes,
    pub endorser_info: EndorserInfo,
    pub participants_count: u32,
    pub total_completions: u32,
}

impl CampaignData {
    pub fn quest(&self, id: u32) -> Option<&QuestData> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.metadata.starting_time > self.metadata.ending_time {
            return Err(ValidationError::new(
                "metadata.starting_time",
                format!(
                    "starting_time {} is after ending_time {}",
                    self.metadata.starting_time, self.metadata.ending_time
                ),
            ));
        }
        for (i, quest) in self.quests.iter().enumerate() {
            quest
                .validate()
                .map_err(|e| e.within(&format!("quests[{}]", i)))?;
        }
        Ok(())
    }
}

impl Record for CampaignData {
    const SCHEMA: &'static str = names::CAMPAIGN_DATA;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::byte32(&self.id),
            self.creator.to_value(),
            self.metadata.to_value(),
            Value::uint(self.status),
            records(&self.quests),
            Value::bytes(self.title.clone()),
            Value::bytes(self.short_description.clone()),
            Value::bytes(self.long_description.clone()),
            self.endorser_info.to_value(),
            Value::uint(self.participants_count),
            Value::uint(self.total_completions),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let out = Self {
            id: f.byte32()?,
            creator: f.record(Script::from_value)?,
            metadata: f.record(CampaignMetadata::from_value)?,
            status: f.u8()?,
            quests: f.vector(QuestData::from_value)?,
            title: f.bytes()?,
            short_description: f.bytes()?,
            long_description: f.bytes()?,
            endorser_info: f.record(EndorserInfo::from_value)?,
            participants_count: f.u32()?,
            total_completions: f.u32()?,
        };
        f.finish()?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::HashType;

    fn campaign() -> CampaignData {
        CampaignData {
            id: Byte32::from_bytes([1; 32]),
            creator: Script::new(Byte32::from_bytes([2; 32]), HashType::Type, vec![3]),
            metadata: CampaignMetadata {
                starting_time: 100,
                ending_time: 200,
                categories: vec![Bytes::from_static(b"defi")],
                rules: vec![Bytes::from_static(b"be nice"), Bytes::new()],
                ..Default::default()
            },
            status: 1,
            quests: Vec::new(),
            title: Bytes::from_static(b"Campaign"),
            short_description: Bytes::new(),
            long_description: Bytes::new(),
            endorser_info: EndorserInfo {
                endorser_lock_hash: Byte32::from_bytes([4; 32]),
                endorser_name: Bytes::from_static(b"Bob"),
                endorser_description: Bytes::new(),
                website: Bytes::new(),
                social_links: Vec::new(),
                verified: 1,
            },
            participants_count: 0,
            total_completions: 0,
        }
    }

    #[test]
    fn test_campaign_without_quests_roundtrip() {
        let data = campaign();
        let bytes = data.encode().unwrap();
        let decoded = CampaignData::decode(&bytes).unwrap();
        assert!(decoded.quests.is_empty());
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_campaign_with_quests_roundtrip() {
        let mut data = campaign();
        data.quests.push(QuestData {
            id: 1,
            campaign_id: data.id,
            ..Default::default()
        });
        let bytes = data.encode().unwrap();
        let decoded = CampaignData::decode(&bytes).unwrap();
        assert_eq!(decoded.quest(1).map(|q| q.id), Some(1));
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_validate_time_window() {
        let mut data = campaign();
        assert!(data.validate().is_ok());
        assert!(data.metadata.is_active_at(150));
        data.metadata.starting_time = 300;
        assert_eq!(data.validate().unwrap_err().field, "metadata.starting_time");
    }

    #[test]
    fn test_validate_reports_quest_path() {
        let mut data = campaign();
        data.quests.push(QuestData::default());
        data.quests.push(QuestData {
            completion_count: 2,
            ..Default::default()
        });
        assert_eq!(
            data.validate().unwrap_err().field,
            "quests[1].completion_count"
        );
    }
}
