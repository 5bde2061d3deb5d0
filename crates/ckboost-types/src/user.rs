//! Per-user side records.

use std::collections::HashSet;

use bytes::Bytes;
use ckboost_codec::{hex_bytes, Byte32, CodecError, Value};
use serde::{Deserialize, Serialize};

use crate::assets::u128_string;
use crate::error::ValidationError;
use crate::record::{records, Record};
use crate::registry::names;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVerificationData {
    #[serde(with = "hex_bytes")]
    pub user_address: Bytes,
    #[serde(with = "u128_string")]
    pub telegram_personal_chat_id: u128,
    #[serde(with = "hex_bytes")]
    pub identity_verification_data: Bytes,
}

impl Record for UserVerificationData {
    const SCHEMA: &'static str = names::USER_VERIFICATION_DATA;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::bytes(self.user_address.clone()),
            Value::uint(self.telegram_personal_chat_id),
            Value::bytes(self.identity_verification_data.clone()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let out = Self {
            user_address: f.bytes()?,
            telegram_personal_chat_id: f.u128()?,
            identity_verification_data: f.bytes()?,
        };
        f.finish()?;
        Ok(out)
    }
}

/// A user's progress in one campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProgressData {
    pub campaign_id: Byte32,
    /// Each quest id at most once.
    pub completed_quest_ids: Vec<u32>,
    pub total_points_earned: u32,
    pub last_activity_timestamp: u64,
}

impl UserProgressData {
    /// Mark a quest completed. Returns false if it already was.
    pub fn complete_quest(&mut self, quest_id: u32, points: u32, timestamp: u64) -> bool {
        if self.completed_quest_ids.contains(&quest_id) {
            return false;
        }
        self.completed_quest_ids.push(quest_id);
        self.total_points_earned = self.total_points_earned.saturating_add(points);
        self.last_activity_timestamp = self.last_activity_timestamp.max(timestamp);
        true
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for (i, id) in self.completed_quest_ids.iter().enumerate() {
            if !seen.insert(*id) {
                return Err(ValidationError::new(
                    format!("completed_quest_ids[{}]", i),
                    format!("quest {} listed more than once", id),
                ));
            }
        }
        Ok(())
    }
}

impl Record for UserProgressData {
    const SCHEMA: &'static str = names::USER_PROGRESS_DATA;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::byte32(&self.campaign_id),
            Value::vector(self.completed_quest_ids.iter().copied().map(Value::uint)),
            Value::uint(self.total_points_earned),
            Value::uint(self.last_activity_timestamp),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let out = Self {
            campaign_id: f.byte32()?,
            completed_quest_ids: f.vector(|v| v.into_u32("UserProgressData.completed_quest_ids"))?,
            total_points_earned: f.u32()?,
            last_activity_timestamp: f.u64()?,
        };
        f.finish()?;
        Ok(out)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSubmissionRecord {
    pub campaign_id: Byte32,
    pub quest_id: u32,
    pub submission_timestamp: u64,
    #[serde(with = "hex_bytes")]
    pub submission_content: Bytes,
}

impl Record for UserSubmissionRecord {
    const SCHEMA: &'static str = names::USER_SUBMISSION_RECORD;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::byte32(&self.campaign_id),
            Value::uint(self.quest_id),
            Value::uint(self.submission_timestamp),
            Value::bytes(self.submission_content.clone()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let out = Self {
            campaign_id: f.byte32()?,
            quest_id: f.u32()?,
            submission_timestamp: f.u64()?,
            submission_content: f.bytes()?,
        };
        f.finish()?;
        Ok(out)
    }
}

/// State of a user cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub verification_data: UserVerificationData,
    pub total_points_earned: u32,
    pub last_activity_timestamp: u64,
    pub submission_records: Vec<UserSubmissionRecord>,
    pub campaign_progress: Vec<UserProgressData>,
}

impl UserData {
    pub fn progress_mut(&mut self, campaign_id: &Byte32) -> &mut UserProgressData {
        let idx = match self
            .campaign_progress
            .iter()
            .position(|p| &p.campaign_id == campaign_id)
        {
            Some(idx) => idx,
            None => {
                self.campaign_progress.push(UserProgressData {
                    campaign_id: *campaign_id,
                    ..Default::default()
                });
                self.campaign_progress.len() - 1
            }
        };
        &mut self.campaign_progress[idx]
    }

    /// Record a quest completion in the matching campaign progress and
    /// the user-wide totals.
    pub fn complete_quest(
        &mut self,
        campaign_id: &Byte32,
        quest_id: u32,
        points: u32,
        timestamp: u64,
    ) -> bool {
        if !self
            .progress_mut(campaign_id)
            .complete_quest(quest_id, points, timestamp)
        {
            return false;
        }
        self.total_points_earned = self.total_points_earned.saturating_add(points);
        self.last_activity_timestamp = self.last_activity_timestamp.max(timestamp);
        true
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (i, progress) in self.campaign_progress.iter().enumerate() {
            progress
                .validate()
                .map_err(|e| e.within(&format!("campaign_progress[{}]", i)))?;
        }
        Ok(())
    }
}

impl Record for UserData {
    const SCHEMA: &'static str = names::USER_DATA;

    fn to_value(&self) -> Value {
        Value::record(vec![
            self.verification_data.to_value(),
            Value::uint(self.total_points_earned),
            Value::uint(self.last_activity_timestamp),
            records(&self.submission_records),
            records(&self.campaign_progress),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let out = Self {
            verification_data: f.record(UserVerificationData::from_value)?,
            total_points_earned: f.u32()?,
            last_activity_timestamp: f.u64()?,
            submission_records: f.vector(UserSubmissionRecord::from_value)?,
            campaign_progress: f.vector(UserProgressData::from_value)?,
        };
        f.finish()?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_quest_is_idempotent() {
        let mut progress = UserProgressData::default();
        assert!(progress.complete_quest(1, 10, 5));
        assert!(!progress.complete_quest(1, 10, 6));
        assert_eq!(progress.completed_quest_ids, vec![1]);
        assert_eq!(progress.total_points_earned, 10);
        assert_eq!(progress.last_activity_timestamp, 5);
        assert!(progress.validate().is_ok());
    }

    #[test]
    fn test_duplicate_quest_ids_rejected() {
        let progress = UserProgressData {
            completed_quest_ids: vec![1, 2, 1],
            ..Default::default()
        };
        assert_eq!(progress.validate().unwrap_err().field, "completed_quest_ids[2]");
    }

    #[test]
    fn test_user_data_roundtrip() {
        let campaign = Byte32::from_bytes([6; 32]);
        let mut user = UserData {
            verification_data: UserVerificationData {
                user_address: Bytes::from_static(b"ckt1q"),
                telegram_personal_chat_id: 123456789,
                identity_verification_data: Bytes::new(),
            },
            submission_records: vec![UserSubmissionRecord {
                campaign_id: campaign,
                quest_id: 2,
                submission_timestamp: 9,
                submission_content: Bytes::from_static(b"proof"),
            }],
            ..Default::default()
        };
        assert!(user.complete_quest(&campaign, 2, 30, 9));
        assert!(!user.complete_quest(&campaign, 2, 30, 10));
        assert_eq!(user.total_points_earned, 30);

        let bytes = user.encode().unwrap();
        let decoded = UserData::decode(&bytes).unwrap();
        assert_eq!(decoded, user);
        assert!(decoded.validate().is_ok());
    }
}
