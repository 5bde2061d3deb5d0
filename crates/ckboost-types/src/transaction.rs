//! Transaction records.

use bytes::Bytes;
use ckboost_codec::{hex_bytes_vec, Byte32, CodecError, Value};
use serde::{Deserialize, Serialize};

use crate::record::{byte_strings, hashes, records, Record};
use crate::registry::names;
use crate::script::{CellDep, CellInput, CellOutput};

/// The signed-over part of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub version: u32,
    pub cell_deps: Vec<CellDep>,
    pub header_deps: Vec<Byte32>,
    pub inputs: Vec<CellInput>,
    pub outputs: Vec<CellOutput>,
    #[serde(with = "hex_bytes_vec")]
    pub outputs_data: Vec<Bytes>,
}

impl Record for RawTransaction {
    const SCHEMA: &'static str = names::RAW_TRANSACTION;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::uint(self.version),
            records(&self.cell_deps),
            hashes(&self.header_deps),
            records(&self.inputs),
            records(&self.outputs),
            byte_strings(&self.outputs_data),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let version = f.u32()?;
        let cell_deps = f.vector(CellDep::from_value)?;
        let header_deps = f.vector(|v| v.into_byte32("RawTransaction.header_deps"))?;
        let inputs = f.vector(CellInput::from_value)?;
        let outputs = f.vector(CellOutput::from_value)?;
        let outputs_data = f.vector(|v| v.into_bytes("RawTransaction.outputs_data"))?;
        f.finish()?;
        Ok(Self {
            version,
            cell_deps,
            header_deps,
            inputs,
            outputs,
            outputs_data,
        })
    }
}

/// A full transaction with witnesses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub raw: RawTransaction,
    #[serde(with = "hex_bytes_vec")]
    pub witnesses: Vec<Bytes>,
}

impl Transaction {
    /// A skeleton with no deps, inputs or outputs.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True if `dep` is already among the cell deps.
    pub fn has_cell_dep(&self, dep: &CellDep) -> bool {
        self.raw.cell_deps.contains(dep)
    }

    /// Append `dep` unless an identical dep is already present.
    pub fn ensure_cell_dep(&mut self, dep: CellDep) -> bool {
        if self.has_cell_dep(&dep) {
            return false;
        }
        self.raw.cell_deps.push(dep);
        true
    }
}

impl Record for Transaction {
    const SCHEMA: &'static str = names::TRANSACTION;

    fn to_value(&self) -> Value {
        Value::record(vec![self.raw.to_value(), byte_strings(&self.witnesses)])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let raw = f.record(RawTransaction::from_value)?;
        let witnesses = f.vector(|v| v.into_bytes("Transaction.witnesses"))?;
        f.finish()?;
        Ok(Self { raw, witnesses })
    }
}
