//! Comparison rules for vectors and scripts.
//!
//! Membership vectors (admins, endorsers) are edited through explicit
//! add/remove staging and compared as sets. Script vectors are compared
//! element-wise and in order.

use std::collections::HashSet;
use std::hash::Hash;

use bytes::Bytes;
use ckboost_codec::{normalize_to_width, Byte32, Numeric, Uint256, Width};
use ckboost_types::{parse_byte32, parse_hash_type, parse_hex_bytes, HashType, Script, ScriptInput};
use serde::{Deserialize, Serialize};

use crate::error::{DiffError, Result};

/// Apply staged removals then additions to a baseline list.
///
/// Removal keeps the baseline order; additions are appended in staging
/// order and skipped if already present.
pub fn apply_staging<T: Clone + Eq + Hash>(baseline: &[T], to_add: &[T], to_remove: &[T]) -> Vec<T> {
    let removed: HashSet<&T> = to_remove.iter().collect();
    let mut out: Vec<T> = baseline
        .iter()
        .filter(|item| !removed.contains(item))
        .cloned()
        .collect();
    for item in to_add {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

/// True if the two lists hold different sets of items.
pub fn membership_changed<T: Eq + Hash>(baseline: &[T], next: &[T]) -> bool {
    let a: HashSet<&T> = baseline.iter().collect();
    let b: HashSet<&T> = next.iter().collect();
    a != b
}

/// A script reduced to the parts that matter for comparison.
///
/// `code_hash: None` is an unset script (empty form field). It equals
/// another unset script and never equals a script with the zero hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalScript {
    pub code_hash: Option<Byte32>,
    pub hash_type: Option<HashType>,
    #[serde(with = "ckboost_codec::hex_bytes")]
    pub args: Bytes,
}

impl CanonicalScript {
    /// Canonicalize an edited script. Empty strings mean unset.
    pub fn from_input(field: &str, input: &ScriptInput) -> Result<Self> {
        let code_hash = match input.code_hash.trim() {
            "" => None,
            s => Some(parse_byte32(&format!("{}.codeHash", field), s)?),
        };
        let hash_type = match input.hash_type.trim() {
            "" => None,
            s => Some(parse_hash_type(&format!("{}.hashType", field), s)?),
        };
        let args = parse_hex_bytes(&format!("{}.args", field), &input.args)?;
        Ok(Self {
            code_hash,
            hash_type,
            args,
        })
    }

    /// The on-chain script, if every part is set.
    pub fn to_script(&self) -> Option<Script> {
        Some(Script {
            code_hash: self.code_hash?,
            hash_type: self.hash_type?,
            args: self.args.clone(),
        })
    }
}

impl From<&Script> for CanonicalScript {
    fn from(script: &Script) -> Self {
        Self {
            code_hash: Some(script.code_hash),
            hash_type: Some(script.hash_type),
            args: script.args.clone(),
        }
    }
}

/// Canonicalize a list of edited scripts.
pub fn canonical_scripts(field: &str, inputs: &[ScriptInput]) -> Result<Vec<CanonicalScript>> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, s)| CanonicalScript::from_input(&format!("{}[{}]", field, i), s))
        .collect()
}

/// Order-significant comparison: lengths, then each element.
pub fn scripts_changed(baseline: &[CanonicalScript], next: &[CanonicalScript]) -> bool {
    baseline.len() != next.len() || baseline.iter().zip(next).any(|(a, b)| a != b)
}

/// Normalize a numeric input for comparison, failing on the candidate side.
pub fn canonical_uint(field: &str, input: &Numeric, width: Width) -> Result<Uint256> {
    normalize_to_width(input, width).map_err(|e| DiffError::candidate(field, e))
}
