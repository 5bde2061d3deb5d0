//! Merge a change-set into the baseline to produce the next record.

use ckboost_diff::{CanonicalScript, FieldChange, ProtocolChanges};
use ckboost_types::{ProtocolData, Script, ValidationError};

use crate::error::Result;

fn scripts(field: &str, change: &FieldChange<Vec<CanonicalScript>>) -> Result<Vec<Script>> {
    change
        .resolved()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            s.to_script().ok_or_else(|| {
                ValidationError::new(
                    format!("scriptCodeHashes.{}[{}]", field, i),
                    "script code hash and hash type must be set",
                )
                .into()
            })
        })
        .collect()
}

/// Build the record that replaces `baseline` on chain.
///
/// The baseline is not modified. The result must satisfy every protocol
/// invariant and carry a `last_updated` later than the baseline's.
pub fn materialize_protocol_data(
    baseline: &ProtocolData,
    changes: &ProtocolChanges,
    last_updated: u64,
) -> Result<ProtocolData> {
    let mut next = baseline.clone();

    next.protocol_config.admin_lock_hash_vec = changes.admin_lock_hash_vec.resolved().clone();

    let s = &changes.script_code_hashes;
    let hashes = &mut next.protocol_config.script_code_hashes;
    hashes.ckb_boost_protocol_type_code_hash = *s.ckb_boost_protocol_type_code_hash.resolved();
    hashes.ckb_boost_protocol_lock_code_hash = *s.ckb_boost_protocol_lock_code_hash.resolved();
    hashes.ckb_boost_campaign_type_code_hash = *s.ckb_boost_campaign_type_code_hash.resolved();
    hashes.ckb_boost_campaign_lock_code_hash = *s.ckb_boost_campaign_lock_code_hash.resolved();
    hashes.ckb_boost_user_type_code_hash = *s.ckb_boost_user_type_code_hash.resolved();
    hashes.ckb_boost_points_udt_type_code_hash = *s.ckb_boost_points_udt_type_code_hash.resolved();
    hashes.accepted_udt_type_scripts =
        scripts("acceptedUdtTypeScripts", &s.accepted_udt_type_scripts)?;
    hashes.accepted_dob_type_scripts =
        scripts("acceptedDobTypeScripts", &s.accepted_dob_type_scripts)?;

    let t = &changes.tipping_config;
    next.tipping_config.approval_requirement_thresholds = t
        .approval_requirement_thresholds
        .resolved()
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.to_u128().map_err(|e| {
                ValidationError::new(
                    format!("tippingConfig.approvalRequirementThresholds[{}]", i),
                    e.to_string(),
                )
            })
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    next.tipping_config.expiration_duration = t
        .expiration_duration
        .resolved()
        .to_u64()
        .map_err(|e| ValidationError::new("tippingConfig.expirationDuration", e.to_string()))?;

    next.endorsers_whitelist = changes.endorsers_whitelist.resolved().clone();
    next.campaigns_approved = changes.campaigns_approved.resolved().clone();
    next.tipping_proposals = changes.tipping_proposals.resolved().clone();
    next.last_updated = last_updated;

    baseline.check_successor(&next)?;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TxError;
    use ckboost_codec::Byte32;
    use ckboost_diff::{diff_protocol, ProtocolStaging};
    use bytes::Bytes;
    use ckboost_diff::diff_protocol_data;
    use ckboost_types::{ProtocolConfig, ScriptInput, TippingConfig, TippingProposalData};

    fn baseline() -> ProtocolData {
        ProtocolData {
            tipping_config: TippingConfig {
                approval_requirement_thresholds: vec![100000000000],
                expiration_duration: 10,
            },
            last_updated: 50,
            protocol_config: ProtocolConfig {
                admin_lock_hash_vec: vec![Byte32::from_bytes([0xa; 32])],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_materialize_applies_every_change() {
        let base = baseline();
        let mut staging = ProtocolStaging::from_baseline(&base);
        staging.add_admin(Byte32::from_bytes([0xb; 32]));
        staging.tipping_config.expiration_duration = "20".into();
        staging.script_code_hashes.accepted_udt_type_scripts.push(ScriptInput {
            code_hash: Byte32::from_bytes([7; 32]).to_string(),
            hash_type: "type".into(),
            args: "0x".into(),
        });
        let changes = diff_protocol(&base, &staging).unwrap();

        let next = materialize_protocol_data(&base, &changes, 51).unwrap();
        assert_eq!(next.protocol_config.admin_lock_hash_vec.len(), 2);
        assert_eq!(next.tipping_config.expiration_duration, 20);
        assert_eq!(next.protocol_config.script_code_hashes.accepted_udt_type_scripts.len(), 1);
        assert_eq!(next.last_updated, 51);
        assert_eq!(base.last_updated, 50);
    }

    #[test]
    fn test_materialize_carries_proposal_and_campaign_edits() {
        let base = baseline();
        let mut candidate = base.clone();
        candidate.tipping_proposals.push(TippingProposalData {
            target_address: Bytes::from_static(b"ckt1qtarget"),
            proposer_lock_hash: Byte32::from_bytes([0xa; 32]),
            metadata: Default::default(),
            amount: 42,
            tipping_transaction_hash: None,
            approval_transaction_hash: Vec::new(),
        });
        let changes = diff_protocol_data(&base, &candidate).unwrap();

        let next = materialize_protocol_data(&base, &changes, 51).unwrap();
        assert_eq!(next.tipping_proposals, candidate.tipping_proposals);
        assert!(base.tipping_proposals.is_empty());

        let cleared = diff_protocol_data(&next, &base).unwrap();
        assert!(cleared.tipping_proposals.has_changed);
        let reverted = materialize_protocol_data(&next, &cleared, 52).unwrap();
        assert!(reverted.tipping_proposals.is_empty());
        assert_eq!(reverted.campaigns_approved, base.campaigns_approved);
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let base = baseline();
        let changes = diff_protocol(&base, &ProtocolStaging::from_baseline(&base)).unwrap();
        let err = materialize_protocol_data(&base, &changes, 50).unwrap_err();
        assert!(matches!(err, TxError::Validation(ref v) if v.field == "last_updated"));
    }

    #[test]
    fn test_removing_last_admin_rejected() {
        let base = baseline();
        let mut staging = ProtocolStaging::from_baseline(&base);
        staging.remove_admin(Byte32::from_bytes([0xa; 32]));
        let changes = diff_protocol(&base, &staging).unwrap();
        let err = materialize_protocol_data(&base, &changes, 60).unwrap_err();
        assert!(matches!(err, TxError::Validation(_)));
    }

    #[test]
    fn test_unset_script_cannot_be_written() {
        let base = baseline();
        let mut staging = ProtocolStaging::from_baseline(&base);
        staging.script_code_hashes.accepted_dob_type_scripts.push(ScriptInput {
            code_hash: String::new(),
            hash_type: "type".into(),
            args: String::new(),
        });
        let changes = diff_protocol(&base, &staging).unwrap();
        let err = materialize_protocol_data(&base, &changes, 60).unwrap_err();
        match err {
            TxError::Validation(v) => {
                assert_eq!(v.field, "scriptCodeHashes.acceptedDobTypeScripts[0]")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
