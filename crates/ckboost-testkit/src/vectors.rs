//! Golden byte vectors.
//!
//! Each vector pins the exact molecule encoding of one record so that any
//! other implementation can be checked byte for byte against this one.

use ckboost_codec::CodecError;
use serde::Serialize;
use ckboost_types::{
    CellDep, OutPoint, ProtocolConfig, ProtocolData, Record, Script, TippingConfig, Transaction,
};

use crate::fixtures::{hash, type_script};

/// A golden test vector.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Schema the bytes are laid out by.
    pub schema: &'static str,
    /// Expected encoding (hex, no prefix).
    pub expected_hex: &'static str,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "tipping config with two thresholds",
            schema: TippingConfig::SCHEMA,
            expected_hex: "380000000c00000030000000\
                           02000000\
                           00e87648170000000000000000000000\
                           0088526a740000000000000000000000\
                           008d270000000000",
        },
        GoldenVector {
            name: "type script with two-byte args",
            schema: Script::SCHEMA,
            expected_hex: "37000000100000003000000031000000\
                           1111111111111111111111111111111111111111111111111111111111111111\
                           01\
                           02000000abcd",
        },
        GoldenVector {
            name: "out point",
            schema: OutPoint::SCHEMA,
            expected_hex: "2222222222222222222222222222222222222222222222222222222222222222\
                           07000000",
        },
        GoldenVector {
            name: "code cell dep",
            schema: CellDep::SCHEMA,
            expected_hex: "c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0\
                           00000000\
                           00",
        },
        GoldenVector {
            name: "empty transaction",
            schema: Transaction::SCHEMA,
            expected_hex: "440000000c00000040000000\
                           340000001c0000002000000024000000280000002c00000030000000\
                           00000000000000000000000000000000\
                           0400000004000000\
                           04000000",
        },
        GoldenVector {
            name: "minimal protocol data",
            schema: ProtocolData::SCHEMA,
            expected_hex: MINIMAL_PROTOCOL_DATA,
        },
    ]
}

const MINIMAL_PROTOCOL_DATA: &str = "\
    640100001c00000020000000240000003c000000400000004800000004000000\
    04000000180000000c0000001000000000000000000000000000000004000000\
    01000000000000001c0100000c0000003000000001000000aaaaaaaaaaaaaaaa\
    aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaec00000024000000\
    440000006400000084000000a4000000c4000000e4000000e800000000000000\
    0000000000000000000000000000000000000000000000000000000000000000\
    0000000000000000000000000000000000000000000000000000000000000000\
    0000000000000000000000000000000000000000000000000000000000000000\
    0000000000000000000000000000000000000000000000000000000000000000\
    0000000000000000000000000000000000000000000000000000000000000000\
    0000000000000000000000000000000000000000000000000000000004000000\
    04000000";

/// Encode the record a vector describes.
pub fn encode_vector(vector: &GoldenVector) -> Result<Vec<u8>, CodecError> {
    match vector.schema {
        s if s == TippingConfig::SCHEMA => TippingConfig {
            approval_requirement_thresholds: vec![100000000000, 500000000000],
            expiration_duration: 2592000,
        }
        .encode(),
        s if s == Script::SCHEMA => type_script(hash(0x11), &[0xab, 0xcd]).encode(),
        s if s == OutPoint::SCHEMA => OutPoint::new(hash(0x22), 7).encode(),
        s if s == CellDep::SCHEMA => CellDep::code(OutPoint::new(hash(0xc0), 0)).encode(),
        s if s == Transaction::SCHEMA => Transaction::empty().encode(),
        s if s == ProtocolData::SCHEMA => ProtocolData {
            last_updated: 1,
            protocol_config: ProtocolConfig {
                admin_lock_hash_vec: vec![hash(0xaa)],
                ..Default::default()
            },
            ..Default::default()
        }
        .encode(),
        other => Err(CodecError::UnknownSchema(other.to_string())),
    }
}

/// Expected bytes of a vector.
pub fn expected_bytes(vector: &GoldenVector) -> Vec<u8> {
    let compact: String = vector
        .expected_hex
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    hex::decode(compact).unwrap_or_default()
}

/// Verify all golden vectors.
///
/// Returns `(name, matches, actual_hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| match encode_vector(v) {
            Ok(bytes) => (v.name.to_string(), bytes == expected_bytes(v), hex::encode(bytes)),
            Err(e) => (v.name.to_string(), false, e.to_string()),
        })
        .collect()
}

/// Export the vectors with their actual encodings as pretty JSON.
pub fn vectors_json() -> serde_json::Result<String> {
    #[derive(Serialize)]
    struct Exported {
        #[serde(flatten)]
        vector: GoldenVector,
        actual_hex: String,
    }

    let exported: Vec<Exported> = all_vectors()
        .into_iter()
        .map(|vector| {
            let actual_hex = encode_vector(&vector)
                .map(hex::encode)
                .unwrap_or_default();
            Exported { vector, actual_hex }
        })
        .collect();
    serde_json::to_string_pretty(&exported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, actual) in verify_all_vectors() {
            assert!(matches, "vector '{}' encoded as {}", name, actual);
        }
    }

    #[test]
    fn test_vectors_decode_back() {
        let tipping = &all_vectors()[0];
        let decoded = TippingConfig::decode(&expected_bytes(tipping)).unwrap();
        assert_eq!(decoded.approval_requirement_thresholds, vec![100000000000, 500000000000]);
        assert_eq!(decoded.expiration_duration, 2592000);

        let protocol = all_vectors()
            .into_iter()
            .find(|v| v.schema == ProtocolData::SCHEMA)
            .unwrap();
        let data = ProtocolData::decode(&expected_bytes(&protocol)).unwrap();
        assert_eq!(data.last_updated, 1);
        assert_eq!(data.protocol_config.admin_lock_hash_vec, vec![hash(0xaa)]);
    }

    #[test]
    fn test_vectors_json_lists_every_vector() {
        let json: serde_json::Value = serde_json::from_str(&vectors_json().unwrap()).unwrap();
        let entries = json.as_array().unwrap();
        assert_eq!(entries.len(), all_vectors().len());
        assert_eq!(entries[2]["schema"], "OutPoint");
        assert!(entries.iter().all(|e| !e["actual_hex"].as_str().unwrap().is_empty()));
    }
}
