//! Test fixtures and helpers.
//!
//! Sample records that satisfy every protocol invariant, built either
//! deterministically or from a seeded RNG.

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ckboost_codec::Byte32;
use ckboost_types::{
    CampaignData, CampaignMetadata, EndorserInfo, HashType, ProtocolConfig, ProtocolData,
    QuestData, Script, ScriptCodeHashes, TippingConfig,
};

/// A deterministic hash filled with `byte`.
pub fn hash(byte: u8) -> Byte32 {
    Byte32::from_bytes([byte; 32])
}

/// A `type` script over `code_hash` with `args`.
pub fn type_script(code_hash: Byte32, args: &[u8]) -> Script {
    Script::new(code_hash, HashType::Type, args.to_vec())
}

pub fn endorser(byte: u8, name: &str) -> EndorserInfo {
    EndorserInfo {
        endorser_lock_hash: hash(byte),
        endorser_name: Bytes::copy_from_slice(name.as_bytes()),
        endorser_description: Bytes::from_static(b"community endorser"),
        website: Bytes::new(),
        social_links: vec![],
        verified: 1,
    }
}

/// The protocol record used across tests: two admins, one endorser, the
/// default thresholds and one accepted UDT script.
pub fn sample_protocol_data() -> ProtocolData {
    ProtocolData {
        campaigns_approved: vec![],
        tipping_proposals: vec![],
        tipping_config: TippingConfig {
            approval_requirement_thresholds: vec![100000000000, 500000000000],
            expiration_duration: 2592000,
        },
        endorsers_whitelist: vec![endorser(0xe1, "alpha")],
        last_updated: 1_700_000_000,
        protocol_config: ProtocolConfig {
            admin_lock_hash_vec: vec![hash(0xa1), hash(0xa2)],
            script_code_hashes: ScriptCodeHashes {
                ckb_boost_protocol_type_code_hash: hash(0x01),
                ckb_boost_protocol_lock_code_hash: hash(0x02),
                ckb_boost_campaign_type_code_hash: hash(0x03),
                ckb_boost_campaign_lock_code_hash: hash(0x04),
                ckb_boost_user_type_code_hash: hash(0x05),
                ckb_boost_points_udt_type_code_hash: hash(0x06),
                accepted_udt_type_scripts: vec![type_script(hash(0x10), &[0x01])],
                accepted_dob_type_scripts: vec![],
            },
        },
    }
}

/// A campaign with no quests.
pub fn sample_campaign(id: Byte32) -> CampaignData {
    CampaignData {
        id,
        creator: type_script(hash(0x20), &[]),
        metadata: CampaignMetadata {
            created_at: 1_700_000_000,
            starting_time: 1_700_000_000,
            ending_time: 1_700_600_000,
            ..Default::default()
        },
        status: 0,
        quests: vec![],
        title: Bytes::from_static(b"Sample campaign"),
        short_description: Bytes::new(),
        long_description: Bytes::new(),
        endorser_info: endorser(0xe1, "alpha"),
        participants_count: 0,
        total_completions: 0,
    }
}

/// Builds random but valid records from a seed.
pub struct Fixture {
    rng: StdRng,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn hash(&mut self) -> Byte32 {
        Byte32::from_bytes(self.rng.gen())
    }

    pub fn script(&mut self) -> Script {
        let args: [u8; 20] = self.rng.gen();
        Script::new(self.hash(), HashType::Type, args.to_vec())
    }

    pub fn endorser(&mut self) -> EndorserInfo {
        EndorserInfo {
            endorser_lock_hash: self.hash(),
            endorser_name: Bytes::from(format!("endorser-{}", self.rng.gen::<u16>())),
            endorser_description: Bytes::new(),
            website: Bytes::new(),
            social_links: vec![],
            verified: self.rng.gen_range(0..=1),
        }
    }

    pub fn quest(&mut self, id: u32, campaign_id: Byte32) -> QuestData {
        QuestData {
            id,
            campaign_id,
            points: self.rng.gen_range(1..=500),
            ..Default::default()
        }
    }

    pub fn campaign(&mut self, quests: u32) -> CampaignData {
        let id = self.hash();
        let mut campaign = sample_campaign(id);
        campaign.creator = self.script();
        campaign.quests = (1..=quests).map(|q| self.quest(q, id)).collect();
        campaign
    }

    /// Protocol data with `admins` admins (at least one) and `endorsers`
    /// distinct endorsers.
    pub fn protocol_data(&mut self, admins: usize, endorsers: usize) -> ProtocolData {
        let mut data = sample_protocol_data();
        data.protocol_config.admin_lock_hash_vec =
            (0..admins.max(1)).map(|_| self.hash()).collect();
        data.endorsers_whitelist = (0..endorsers).map(|_| self.endorser()).collect();
        data.campaigns_approved = vec![self.campaign(2)];
        data.last_updated = self.rng.gen_range(1..1_000_000);
        data
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
