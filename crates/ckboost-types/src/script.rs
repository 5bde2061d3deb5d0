//! Chain-level identifiers: scripts, out points and cell dependencies.

use bytes::Bytes;
use ckboost_codec::{hex_bytes, Byte32, CodecError, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::Record;
use crate::registry::names;

/// How a script's code hash is matched against cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum HashType {
    Data = 0,
    Type = 1,
    Data1 = 2,
    Data2 = 4,
}

impl HashType {
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Data),
            1 => Some(Self::Type),
            2 => Some(Self::Data1),
            4 => Some(Self::Data2),
            _ => None,
        }
    }

    /// Parse the textual form used by clients (`"type"`, `"data1"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "data" => Some(Self::Data),
            "type" => Some(Self::Type),
            "data1" => Some(Self::Data1),
            "data2" => Some(Self::Data2),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Type => "type",
            Self::Data1 => "data1",
            Self::Data2 => "data2",
        }
    }
}

impl fmt::Display for HashType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn hash_type_from_value(value: Value, context: &str) -> Result<HashType, CodecError> {
    let raw = value.into_u8(context)?;
    HashType::from_u8(raw)
        .ok_or_else(|| CodecError::layout(context, format!("invalid hash_type {}", raw)))
}

/// A lock or type script: `{code_hash, hash_type, args}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Script {
    #[serde(alias = "codeHash")]
    pub code_hash: Byte32,
    #[serde(alias = "hashType")]
    pub hash_type: HashType,
    #[serde(with = "hex_bytes")]
    pub args: Bytes,
}

impl Script {
    pub fn new(code_hash: Byte32, hash_type: HashType, args: impl Into<Bytes>) -> Self {
        Self {
            code_hash,
            hash_type,
            args: args.into(),
        }
    }
}

impl Record for Script {
    const SCHEMA: &'static str = names::SCRIPT;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::byte32(&self.code_hash),
            Value::uint(self.hash_type.to_u8()),
            Value::bytes(self.args.clone()),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let code_hash = f.byte32()?;
        let hash_type = f.record(|v| hash_type_from_value(v, "Script.hash_type"))?;
        let args = f.bytes()?;
        f.finish()?;
        Ok(Self {
            code_hash,
            hash_type,
            args,
        })
    }
}

/// Reference to a transaction output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    #[serde(alias = "txHash")]
    pub tx_hash: Byte32,
    pub index: u32,
}

impl OutPoint {
    pub fn new(tx_hash: Byte32, index: u32) -> Self {
        Self { tx_hash, index }
    }
}

impl Record for OutPoint {
    const SCHEMA: &'static str = names::OUT_POINT;

    fn to_value(&self) -> Value {
        Value::record(vec![Value::byte32(&self.tx_hash), Value::uint(self.index)])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let tx_hash = f.byte32()?;
        let index = f.u32()?;
        f.finish()?;
        Ok(Self { tx_hash, index })
    }
}

/// Kind of a cell dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum DepType {
    Code = 0,
    DepGroup = 1,
}

impl DepType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Code),
            1 => Some(Self::DepGroup),
            _ => None,
        }
    }
}

/// A cell dependency attached to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellDep {
    pub out_point: OutPoint,
    pub dep_type: DepType,
}

impl CellDep {
    /// A `code` dependency on the given cell.
    pub fn code(out_point: OutPoint) -> Self {
        Self {
            out_point,
            dep_type: DepType::Code,
        }
    }
}

impl Record for CellDep {
    const SCHEMA: &'static str = names::CELL_DEP;

    fn to_value(&self) -> Value {
        Value::record(vec![
            self.out_point.to_value(),
            Value::uint(self.dep_type as u8),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let out_point = f.record(OutPoint::from_value)?;
        let raw = f.u8()?;
        f.finish()?;
        let dep_type = DepType::from_u8(raw)
            .ok_or_else(|| CodecError::layout("CellDep.dep_type", format!("invalid dep_type {}", raw)))?;
        Ok(Self {
            out_point,
            dep_type,
        })
    }
}

/// A transaction input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellInput {
    pub since: u64,
    pub previous_output: OutPoint,
}

impl Record for CellInput {
    const SCHEMA: &'static str = names::CELL_INPUT;

    fn to_value(&self) -> Value {
        Value::record(vec![Value::uint(self.since), self.previous_output.to_value()])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let since = f.u64()?;
        let previous_output = f.record(OutPoint::from_value)?;
        f.finish()?;
        Ok(Self {
            since,
            previous_output,
        })
    }
}

/// A transaction output (cell) without its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellOutput {
    pub capacity: u64,
    pub lock: Script,
    #[serde(rename = "type")]
    pub type_: Option<Script>,
}

impl Record for CellOutput {
    const SCHEMA: &'static str = names::CELL_OUTPUT;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::uint(self.capacity),
            self.lock.to_value(),
            Value::option(self.type_.as_ref().map(Script::to_value)),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let capacity = f.u64()?;
        let lock = f.record(Script::from_value)?;
        let type_ = f.option(Script::from_value)?;
        f.finish()?;
        Ok(Self {
            capacity,
            lock,
            type_,
        })
    }
}

/// Links a campaign or user cell to its owner by type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectedTypeId {
    pub type_id: Byte32,
    pub connected_key: Byte32,
}

impl Record for ConnectedTypeId {
    const SCHEMA: &'static str = names::CONNECTED_TYPE_ID;

    fn to_value(&self) -> Value {
        Value::record(vec![
            Value::byte32(&self.type_id),
            Value::byte32(&self.connected_key),
        ])
    }

    fn from_value(value: Value) -> Result<Self, CodecError> {
        let mut f = value.into_fields(Self::SCHEMA)?;
        let type_id = f.byte32()?;
        let connected_key = f.byte32()?;
        f.finish()?;
        Ok(Self {
            type_id,
            connected_key,
        })
    }
}
