//! # CKBoost Testkit
//!
//! Testing utilities for CKBoost records.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: exact molecule encodings for cross-implementation checks
//! - **Generators**: proptest strategies for every record kind
//! - **Fixtures**: valid sample records, fixed or seeded
//!
//! ## Golden Vectors
//!
//! ```rust
//! use ckboost_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, actual) in verify_all_vectors() {
//!     assert!(matches, "{}: {}", name, actual);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use ckboost_testkit::generators::protocol_data;
//! use ckboost_types::Record;
//!
//! proptest! {
//!     #[test]
//!     fn protocol_data_roundtrips(data in protocol_data()) {
//!         let bytes = data.encode().unwrap();
//!         prop_assert_eq!(ckboost_types::ProtocolData::decode(&bytes).unwrap(), data);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use ckboost_testkit::fixtures::Fixture;
//!
//! let data = Fixture::with_seed(1).protocol_data(2, 1);
//! assert!(data.validate().is_ok());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{sample_campaign, sample_protocol_data, Fixture};
pub use vectors::{all_vectors, encode_vector, vectors_json, verify_all_vectors, GoldenVector};
