//! Protocol state diffing.
//!
//! A [`ProtocolStaging`] holds the pending edits against a baseline
//! [`ProtocolData`]: add/remove lists for the membership vectors, whole
//! replacement lists for approved campaigns and tipping proposals, and form
//! values for everything else. [`diff_protocol`] turns baseline plus
//! staging into a [`ProtocolChanges`] whose category flags are the OR of
//! their children. The baseline is never mutated.

use ckboost_codec::{Byte32, Uint256, Width};
use ckboost_types::{
    parse_byte32, CampaignData, EndorserInfo, ProtocolData, Record, Script, ScriptCodeHashes,
    ScriptCodeHashesInput, ScriptInput, TippingConfig, TippingConfigInput, TippingProposalData,
};
use serde::{Deserialize, Serialize};

use crate::change::FieldChange;
use crate::compare::{
    apply_staging, canonical_scripts, canonical_uint, membership_changed, scripts_changed,
    CanonicalScript,
};
use crate::error::{DiffError, Result};

// ─────────────────────────────────────────────────────────────
// Staging
// ─────────────────────────────────────────────────────────────

/// Pending edits against a baseline protocol record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolStaging {
    pub admins_to_add: Vec<Byte32>,
    pub admins_to_remove: Vec<Byte32>,
    pub script_code_hashes: ScriptCodeHashesInput,
    pub tipping_config: TippingConfigInput,
    pub endorsers_to_add: Vec<EndorserInfo>,
    pub endorsers_to_remove: Vec<Byte32>,
    /// Ordered; compared element by element against the baseline.
    #[serde(default)]
    pub campaigns_approved: Vec<CampaignData>,
    #[serde(default)]
    pub tipping_proposals: Vec<TippingProposalData>,
    pub last_updated: u64,
}

impl ProtocolStaging {
    /// A staging with no edits: diffing it against `baseline` reports nothing.
    pub fn from_baseline(baseline: &ProtocolData) -> Self {
        let hashes = &baseline.protocol_config.script_code_hashes;
        Self {
            admins_to_add: Vec::new(),
            admins_to_remove: Vec::new(),
            script_code_hashes: ScriptCodeHashesInput::from(hashes),
            tipping_config: TippingConfigInput::from(&baseline.tipping_config),
            endorsers_to_add: Vec::new(),
            endorsers_to_remove: Vec::new(),
            campaigns_approved: baseline.campaigns_approved.clone(),
            tipping_proposals: baseline.tipping_proposals.clone(),
            last_updated: baseline.last_updated,
        }
    }

    /// Stage an admin addition, cancelling a pending removal of the same hash.
    pub fn add_admin(&mut self, lock_hash: Byte32) {
        if let Some(pos) = self.admins_to_remove.iter().position(|h| *h == lock_hash) {
            self.admins_to_remove.remove(pos);
        } else if !self.admins_to_add.contains(&lock_hash) {
            self.admins_to_add.push(lock_hash);
        }
    }

    /// Stage an admin removal, cancelling a pending addition of the same hash.
    pub fn remove_admin(&mut self, lock_hash: Byte32) {
        if let Some(pos) = self.admins_to_add.iter().position(|h| *h == lock_hash) {
            self.admins_to_add.remove(pos);
        } else if !self.admins_to_remove.contains(&lock_hash) {
            self.admins_to_remove.push(lock_hash);
        }
    }

    /// Stage an endorser. A staged endorser with the same lock hash is replaced.
    pub fn add_endorser(&mut self, endorser: EndorserInfo) {
        let lock_hash = endorser.endorser_lock_hash;
        self.endorsers_to_remove.retain(|h| *h != lock_hash);
        self.endorsers_to_add
            .retain(|e| e.endorser_lock_hash != lock_hash);
        self.endorsers_to_add.push(endorser);
    }

    /// Stage an endorser removal, or drop a pending addition of the same hash.
    pub fn remove_endorser(&mut self, lock_hash: Byte32) {
        let was_staged = self.endorsers_to_add.len();
        self.endorsers_to_add
            .retain(|e| e.endorser_lock_hash != lock_hash);
        if was_staged == self.endorsers_to_add.len() && !self.endorsers_to_remove.contains(&lock_hash) {
            self.endorsers_to_remove.push(lock_hash);
        }
    }

    /// True if no list edits are staged. Form fields are not inspected.
    pub fn has_list_edits(&self) -> bool {
        !(self.admins_to_add.is_empty()
            && self.admins_to_remove.is_empty()
            && self.endorsers_to_add.is_empty()
            && self.endorsers_to_remove.is_empty())
    }
}

// ─────────────────────────────────────────────────────────────
// Change-set
// ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptCodeHashesChanges {
    pub ckb_boost_protocol_type_code_hash: FieldChange<Byte32>,
    pub ckb_boost_protocol_lock_code_hash: FieldChange<Byte32>,
    pub ckb_boost_campaign_type_code_hash: FieldChange<Byte32>,
    pub ckb_boost_campaign_lock_code_hash: FieldChange<Byte32>,
    pub ckb_boost_user_type_code_hash: FieldChange<Byte32>,
    pub ckb_boost_points_udt_type_code_hash: FieldChange<Byte32>,
    pub accepted_udt_type_scripts: FieldChange<Vec<CanonicalScript>>,
    pub accepted_dob_type_scripts: FieldChange<Vec<CanonicalScript>>,
    pub has_changed: bool,
}

impl ScriptCodeHashesChanges {
    fn fixed(&self) -> [&FieldChange<Byte32>; 6] {
        [
            &self.ckb_boost_protocol_type_code_hash,
            &self.ckb_boost_protocol_lock_code_hash,
            &self.ckb_boost_campaign_type_code_hash,
            &self.ckb_boost_campaign_lock_code_hash,
            &self.ckb_boost_user_type_code_hash,
            &self.ckb_boost_points_udt_type_code_hash,
        ]
    }

    fn derive_flag(&mut self) {
        self.has_changed = self.fixed().iter().any(|c| c.has_changed)
            || self.accepted_udt_type_scripts.has_changed
            || self.accepted_dob_type_scripts.has_changed;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TippingConfigChanges {
    pub approval_requirement_thresholds: FieldChange<Vec<Uint256>>,
    pub expiration_duration: FieldChange<Uint256>,
    pub has_changed: bool,
}

/// Field-by-field comparison of a baseline protocol record and its edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolChanges {
    pub admin_lock_hash_vec: FieldChange<Vec<Byte32>>,
    pub script_code_hashes: ScriptCodeHashesChanges,
    pub tipping_config: TippingConfigChanges,
    pub endorsers_whitelist: FieldChange<Vec<EndorserInfo>>,
    pub campaigns_approved: FieldChange<Vec<CampaignData>>,
    pub tipping_proposals: FieldChange<Vec<TippingProposalData>>,
    /// Reported, but never on its own a reason to submit.
    pub last_updated: FieldChange<u64>,
    pub has_changed: bool,
}

impl ProtocolChanges {
    /// Names of the changed leaf fields, for confirmation prompts and logs.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let s = &self.script_code_hashes;
        let t = &self.tipping_config;
        [
            ("admin_lock_hash_vec", self.admin_lock_hash_vec.has_changed),
            ("ckb_boost_protocol_type_code_hash", s.ckb_boost_protocol_type_code_hash.has_changed),
            ("ckb_boost_protocol_lock_code_hash", s.ckb_boost_protocol_lock_code_hash.has_changed),
            ("ckb_boost_campaign_type_code_hash", s.ckb_boost_campaign_type_code_hash.has_changed),
            ("ckb_boost_campaign_lock_code_hash", s.ckb_boost_campaign_lock_code_hash.has_changed),
            ("ckb_boost_user_type_code_hash", s.ckb_boost_user_type_code_hash.has_changed),
            ("ckb_boost_points_udt_type_code_hash", s.ckb_boost_points_udt_type_code_hash.has_changed),
            ("accepted_udt_type_scripts", s.accepted_udt_type_scripts.has_changed),
            ("accepted_dob_type_scripts", s.accepted_dob_type_scripts.has_changed),
            ("approval_requirement_thresholds", t.approval_requirement_thresholds.has_changed),
            ("expiration_duration", t.expiration_duration.has_changed),
            ("endorsers_whitelist", self.endorsers_whitelist.has_changed),
            ("campaigns_approved", self.campaigns_approved.has_changed),
            ("tipping_proposals", self.tipping_proposals.has_changed),
            ("last_updated", self.last_updated.has_changed),
        ]
        .into_iter()
        .filter_map(|(name, changed)| changed.then_some(name))
        .collect()
    }
}

// ─────────────────────────────────────────────────────────────
// Diffing
// ─────────────────────────────────────────────────────────────

fn fixed_hash(old: Byte32, field: &str, input: &str) -> Result<FieldChange<Byte32>> {
    let new = parse_byte32(&format!("scriptCodeHashes.{}", field), input)?;
    Ok(FieldChange::compare(old, new))
}

fn script_list(
    old: &[Script],
    field: &str,
    inputs: &[ScriptInput],
) -> Result<FieldChange<Vec<CanonicalScript>>> {
    let old: Vec<CanonicalScript> = old.iter().map(CanonicalScript::from).collect();
    let new = canonical_scripts(&format!("scriptCodeHashes.{}", field), inputs)?;
    let changed = scripts_changed(&old, &new);
    Ok(FieldChange::with_flag(old, new, changed))
}

fn diff_script_code_hashes(
    baseline: &ScriptCodeHashes,
    form: &ScriptCodeHashesInput,
) -> Result<ScriptCodeHashesChanges> {
    let mut changes = ScriptCodeHashesChanges {
        ckb_boost_protocol_type_code_hash: fixed_hash(
            baseline.ckb_boost_protocol_type_code_hash,
            "ckbBoostProtocolTypeCodeHash",
            &form.ckb_boost_protocol_type_code_hash,
        )?,
        ckb_boost_protocol_lock_code_hash: fixed_hash(
            baseline.ckb_boost_protocol_lock_code_hash,
            "ckbBoostProtocolLockCodeHash",
            &form.ckb_boost_protocol_lock_code_hash,
        )?,
        ckb_boost_campaign_type_code_hash: fixed_hash(
            baseline.ckb_boost_campaign_type_code_hash,
            "ckbBoostCampaignTypeCodeHash",
            &form.ckb_boost_campaign_type_code_hash,
        )?,
        ckb_boost_campaign_lock_code_hash: fixed_hash(
            baseline.ckb_boost_campaign_lock_code_hash,
            "ckbBoostCampaignLockCodeHash",
            &form.ckb_boost_campaign_lock_code_hash,
        )?,
        ckb_boost_user_type_code_hash: fixed_hash(
            baseline.ckb_boost_user_type_code_hash,
            "ckbBoostUserTypeCodeHash",
            &form.ckb_boost_user_type_code_hash,
        )?,
        ckb_boost_points_udt_type_code_hash: fixed_hash(
            baseline.ckb_boost_points_udt_type_code_hash,
            "ckbBoostPointsUdtTypeCodeHash",
            &form.ckb_boost_points_udt_type_code_hash,
        )?,
        accepted_udt_type_scripts: script_list(
            &baseline.accepted_udt_type_scripts,
            "acceptedUdtTypeScripts",
            &form.accepted_udt_type_scripts,
        )?,
        accepted_dob_type_scripts: script_list(
            &baseline.accepted_dob_type_scripts,
            "acceptedDobTypeScripts",
            &form.accepted_dob_type_scripts,
        )?,
        has_changed: false,
    };
    changes.derive_flag();
    Ok(changes)
}

fn diff_tipping_config(
    baseline: &TippingConfig,
    form: &TippingConfigInput,
) -> Result<TippingConfigChanges> {
    let old_thresholds: Vec<Uint256> = baseline
        .approval_requirement_thresholds
        .iter()
        .map(|t| Uint256::from(*t))
        .collect();
    let new_thresholds = form
        .approval_requirement_thresholds
        .iter()
        .enumerate()
        .map(|(i, n)| {
            canonical_uint(
                &format!("tippingConfig.approvalRequirementThresholds[{}]", i),
                n,
                Width::U128,
            )
        })
        .collect::<Result<Vec<_>>>()?;
    let approval_requirement_thresholds = FieldChange::compare(old_thresholds, new_thresholds);
    let expiration_duration = FieldChange::compare(
        Uint256::from(baseline.expiration_duration),
        canonical_uint(
            "tippingConfig.expirationDuration",
            &form.expiration_duration,
            Width::U64,
        )?,
    );
    let has_changed =
        approval_requirement_thresholds.has_changed || expiration_duration.has_changed;
    Ok(TippingConfigChanges {
        approval_requirement_thresholds,
        expiration_duration,
        has_changed,
    })
}

fn staged_endorsers(baseline: &[EndorserInfo], staging: &ProtocolStaging) -> Vec<EndorserInfo> {
    let mut out: Vec<EndorserInfo> = baseline
        .iter()
        .filter(|e| !staging.endorsers_to_remove.contains(&e.endorser_lock_hash))
        .cloned()
        .collect();
    for endorser in &staging.endorsers_to_add {
        match out
            .iter_mut()
            .find(|e| e.endorser_lock_hash == endorser.endorser_lock_hash)
        {
            Some(existing) => *existing = endorser.clone(),
            None => out.push(endorser.clone()),
        }
    }
    out
}

fn endorsers_changed(baseline: &[EndorserInfo], next: &[EndorserInfo]) -> bool {
    baseline.len() != next.len() || next.iter().any(|e| !baseline.contains(e))
}

/// Compare a baseline record against staged edits.
///
/// Fails closed: any malformed form value yields an error and no change-set.
pub fn diff_protocol(baseline: &ProtocolData, staging: &ProtocolStaging) -> Result<ProtocolChanges> {
    let config = &baseline.protocol_config;

    let old_admins = config.admin_lock_hash_vec.clone();
    let new_admins = apply_staging(&old_admins, &staging.admins_to_add, &staging.admins_to_remove);
    let admins_changed = membership_changed(&old_admins, &new_admins);
    let admin_lock_hash_vec = FieldChange::with_flag(old_admins, new_admins, admins_changed);

    let script_code_hashes =
        diff_script_code_hashes(&config.script_code_hashes, &staging.script_code_hashes)?;
    let tipping_config = diff_tipping_config(&baseline.tipping_config, &staging.tipping_config)?;

    let new_endorsers = staged_endorsers(&baseline.endorsers_whitelist, staging);
    let endorsers_changed = endorsers_changed(&baseline.endorsers_whitelist, &new_endorsers);
    let endorsers_whitelist = FieldChange::with_flag(
        baseline.endorsers_whitelist.clone(),
        new_endorsers,
        endorsers_changed,
    );

    let campaigns_approved = FieldChange::compare(
        baseline.campaigns_approved.clone(),
        staging.campaigns_approved.clone(),
    );
    let tipping_proposals = FieldChange::compare(
        baseline.tipping_proposals.clone(),
        staging.tipping_proposals.clone(),
    );

    let last_updated = FieldChange::compare(baseline.last_updated, staging.last_updated);

    let has_changed = admin_lock_hash_vec.has_changed
        || script_code_hashes.has_changed
        || tipping_config.has_changed
        || endorsers_whitelist.has_changed
        || campaigns_approved.has_changed
        || tipping_proposals.has_changed;

    Ok(ProtocolChanges {
        admin_lock_hash_vec,
        script_code_hashes,
        tipping_config,
        endorsers_whitelist,
        campaigns_approved,
        tipping_proposals,
        last_updated,
        has_changed,
    })
}

/// Derive the staging that turns `baseline` into `candidate`.
pub fn staging_between(baseline: &ProtocolData, candidate: &ProtocolData) -> ProtocolStaging {
    let old_admins = &baseline.protocol_config.admin_lock_hash_vec;
    let new_admins = &candidate.protocol_config.admin_lock_hash_vec;
    let mut staging = ProtocolStaging::from_baseline(candidate);
    staging.admins_to_add = new_admins
        .iter()
        .filter(|h| !old_admins.contains(h))
        .copied()
        .collect();
    staging.admins_to_remove = old_admins
        .iter()
        .filter(|h| !new_admins.contains(h))
        .copied()
        .collect();
    staging.endorsers_to_add = candidate
        .endorsers_whitelist
        .iter()
        .filter(|e| !baseline.endorsers_whitelist.contains(e))
        .cloned()
        .collect();
    staging.endorsers_to_remove = baseline
        .endorsers_whitelist
        .iter()
        .map(|e| e.endorser_lock_hash)
        .filter(|h| candidate.endorser(h).is_none())
        .collect();
    staging
}

/// Compare two full protocol records.
pub fn diff_protocol_data(baseline: &ProtocolData, candidate: &ProtocolData) -> Result<ProtocolChanges> {
    diff_protocol(baseline, &staging_between(baseline, candidate))
}

/// Compare two encoded protocol records. Malformed bytes on either side
/// fail the whole diff.
pub fn diff_encoded(baseline: &[u8], candidate: &[u8]) -> Result<ProtocolChanges> {
    let baseline =
        ProtocolData::decode(baseline).map_err(|e| DiffError::baseline("ProtocolData", e))?;
    let candidate =
        ProtocolData::decode(candidate).map_err(|e| DiffError::candidate("ProtocolData", e))?;
    diff_protocol_data(&baseline, &candidate)
}
