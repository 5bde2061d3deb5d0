//! Quests, their sub-tasks and completion records.

use bytes::Bytes;
use ckboost_codec::{hex_bytes, Byte32, CodecError, Value};
use serde::{Deserialize, Serialize};

use crate::assets::AssetList;
use crate::error::ValidationError;
use crate::record::{records, Record};
use crate::registry::names;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestSubTaskData {
    pub id: u8,
    #[serde(with = "hex_bytes")]
    pub title: Bytes,
    #[serde(with = "hex_bytes")]
    pub task_type: Bytes,
    #[serde(with = "hex_bytes")]
    pub description: Bytes,
    #[serde(with = "hex_bytes")]
    pub proof_required: Bytes,
}

impl Record for QuestSubTaskData {
    const SCHEMA: &'static str = names::QUEST_SUB_TASK_DATA;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::uint(self.id),
            Value::bytes(self.title.clone()),
            Value::bytes(self.task_type.clone()),
            Value::bytes(self.description.clone()),
            Value::bytes(self.proof_required.clone()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let out = Self {
            id: f.u8()?,
            title: f.bytes()?,
            task_type: f.bytes()?,
            description: f.bytes()?,
            proof_required: f.bytes()?,
        };
        f.finish()?;
        Ok(out)
    }
}

/// One accepted completion of a quest sub-task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    #[serde(with = "hex_bytes")]
    pub user_address: Bytes,
    pub sub_task_id: u8,
    pub completion_timestamp: u64,
    #[serde(with = "hex_bytes")]
    pub completion_content: Bytes,
}

impl Record for CompletionRecord {
    const SCHEMA: &'static str = names::COMPLETION_RECORD;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::bytes(self.user_address.clone()),
            Value::uint(self.sub_task_id),
            Value::uint(self.completion_timestamp),
            Value::bytes(self.completion_content.clone()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let out = Self {
            user_address: f.bytes()?,
            sub_task_id: f.u8()?,
            completion_timestamp: f.u64()?,
            completion_content: f.bytes()?,
        };
        f.finish()?;
        Ok(out)
    }
}

/// A quest inside a campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestData {
    pub id: u32,
    pub campaign_id: Byte32,
    #[serde(with = "hex_bytes")]
    pub title: Bytes,
    #[serde(with = "hex_bytes")]
    pub description: Bytes,
    #[serde(with = "hex_bytes")]
    pub requirements: Bytes,
    pub rewards_on_completion: Vec<AssetList>,
    pub completion_records: Vec<CompletionRecord>,
    pub completion_deadline: u64,
    pub status: u8,
    pub sub_tasks: Vec<QuestSubTaskData>,
    pub points: u32,
    pub difficulty: u8,
    pub time_estimate: u32,
    pub completion_count: u32,
}

impl QuestData {
    /// Append a completion and bump the counter in step.
    pub fn record_completion(&mut self, record: CompletionRecord) -> Result<(), ValidationError> {
        let next = self.completion_count.checked_add(1).ok_or_else(|| {
            ValidationError::new("completion_count", "counter would overflow u32")
        })?;
        self.completion_records.push(record);
        self.completion_count = next;
        Ok(())
    }

    pub fn has_completed(&self, user_address: &[u8]) -> bool {
        self.completion_records
            .iter()
            .any(|r| r.user_address.as_ref() == user_address)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.completion_count as usize != self.completion_records.len() {
            return Err(ValidationError::new(
                "completion_count",
                format!(
                    "{} does not match {} completion records",
                    self.completion_count,
                    self.completion_records.len()
                ),
            ));
        }
        Ok(())
    }
}

impl Record for QuestData {
    const SCHEMA: &'static str = names::QUEST_DATA;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::uint(self.id),
            Value::byte32(&self.campaign_id),
            Value::bytes(self.title.clone()),
            Value::bytes(self.description.clone()),
            Value::bytes(self.requirements.clone()),
            records(&self.rewards_on_completion),
            records(&self.completion_records),
            Value::uint(self.completion_deadline),
            Value::uint(self.status),
            records(&self.sub_tasks),
            Value::uint(self.points),
            Value::uint(self.difficulty),
            Value::uint(self.time_estimate),
            Value::uint(self.completion_count),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let out = Self {
            id: f.u32()?,
            campaign_id: f.byte32()?,
            title: f.bytes()?,
            description: f.bytes()?,
            requirements: f.bytes()?,
            rewards_on_completion: f.vector(AssetList::from_value)?,
            completion_records: f.vector(CompletionRecord::from_value)?,
            completion_deadline: f.u64()?,
            status: f.u8()?,
            sub_tasks: f.vector(QuestSubTaskData::from_value)?,
            points: f.u32()?,
            difficulty: f.u8()?,
            time_estimate: f.u32()?,
            completion_count: f.u32()?,
        };
        f.finish()?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(user: &'static [u8]) -> CompletionRecord {
        CompletionRecord {
            user_address: Bytes::from_static(user),
            sub_task_id: 1,
            completion_timestamp: 1_700_000_000,
            completion_content: Bytes::from_static(b"https://proof"),
        }
    }

    #[test]
    fn test_quest_roundtrip() {
        let mut quest = QuestData {
            id: 3,
            campaign_id: Byte32::from_bytes([7; 32]),
            title: Bytes::from_static(b"Follow"),
            rewards_on_completion: vec![AssetList {
                ckb_amount: 10,
                ..Default::default()
            }],
            sub_tasks: vec![QuestSubTaskData {
                id: 1,
                title: Bytes::from_static(b"Step"),
                ..Default::default()
            }],
            points: 50,
            ..Default::default()
        };
        quest.record_completion(completion(b"alice")).unwrap();
        let bytes = quest.encode().unwrap();
        assert_eq!(QuestData::decode(&bytes).unwrap(), quest);
    }

    #[test]
    fn test_record_completion_keeps_count_in_step() {
        let mut quest = QuestData::default();
        quest.record_completion(completion(b"alice")).unwrap();
        quest.record_completion(completion(b"bob")).unwrap();
        assert_eq!(quest.completion_count, 2);
        assert!(quest.validate().is_ok());
        assert!(quest.has_completed(b"bob"));
        assert!(!quest.has_completed(b"carol"));
    }

    #[test]
    fn test_validate_count_mismatch() {
        let quest = QuestData {
            completion_count: 1,
            ..Default::default()
        };
        assert_eq!(quest.validate().unwrap_err().field, "completion_count");
    }
}
