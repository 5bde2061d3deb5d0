//! The update-transaction builder.
//!
//! Hands an encoded record and a transaction skeleton to the execution
//! capability and makes sure the result depends on the record's code cell.
//! Without a capability (or when it declines the call) the skeleton comes
//! back unchanged apart from that dependency, flagged as
//! [`BuildMode::Fallback`].

use std::sync::Arc;

use ckboost_types::{CellDep, OutPoint, ProtocolData, Record, Transaction};
use serde::{Deserialize, Serialize};

use crate::capability::{CellQuery, ExecutionCapability, ExecutionContext};
use crate::error::{Result, TxError};

/// Configuration for the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuilderConfig {
    /// Method the execution capability runs.
    pub method: String,
    /// Out point of the code cell that defines the record's scripts.
    pub code_cell: OutPoint,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            method: "CKBoostProtocol.update_protocol".to_string(),
            code_cell: OutPoint::default(),
        }
    }
}

/// How a transaction was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// The execution capability produced the transaction.
    Executed,
    /// The skeleton was returned with only the code dependency attached.
    /// The record is not updated by this transaction.
    Fallback,
}

/// A built transaction and the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTransaction {
    pub tx: Transaction,
    pub mode: BuildMode,
}

impl BuiltTransaction {
    /// True if the transaction does not carry the record update.
    pub fn is_degraded(&self) -> bool {
        self.mode == BuildMode::Fallback
    }
}

/// Builds update transactions for one code cell.
pub struct UpdateTransactionBuilder {
    config: BuilderConfig,
    executor: Option<Arc<dyn ExecutionCapability>>,
    cells: Option<Arc<dyn CellQuery>>,
}

impl UpdateTransactionBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            config,
            executor: None,
            cells: None,
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn ExecutionCapability>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Check that the code cell is live before every build.
    pub fn with_cell_query(mut self, cells: Arc<dyn CellQuery>) -> Self {
        self.cells = Some(cells);
        self
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build a transaction writing `record`.
    ///
    /// An absent skeleton is replaced by an empty transaction. Errors from
    /// the execution capability are returned as they are.
    pub async fn build(
        &self,
        skeleton: Option<Transaction>,
        record: &[u8],
        context: &ExecutionContext,
    ) -> Result<BuiltTransaction> {
        let code_cell = self.config.code_cell;
        if let Some(cells) = &self.cells {
            if cells.get_live_cell(&code_cell).await?.is_none() {
                return Err(TxError::CodeCellNotFound {
                    tx_hash: code_cell.tx_hash,
                    index: code_cell.index,
                });
            }
        }

        let skeleton = skeleton.unwrap_or_else(Transaction::empty);

        let executed = match &self.executor {
            Some(executor) => {
                let args = vec![
                    format!("0x{}", hex::encode(skeleton.encode()?)),
                    format!("0x{}", hex::encode(record)),
                ];
                executor
                    .run_script(&code_cell, &self.config.method, args, context)
                    .await?
            }
            None => None,
        };

        let (mut tx, mode) = match executed {
            Some(response) => (decode_response(&response)?, BuildMode::Executed),
            None => {
                tracing::warn!(
                    method = %self.config.method,
                    "execution capability unavailable, returning skeleton"
                );
                (skeleton, BuildMode::Fallback)
            }
        };

        tx.ensure_cell_dep(CellDep::code(code_cell));
        tracing::debug!(?mode, cell_deps = tx.raw.cell_deps.len(), "built update transaction");
        Ok(BuiltTransaction { tx, mode })
    }

    /// Build a transaction writing `data` as the new protocol record.
    pub async fn build_protocol_update(
        &self,
        skeleton: Option<Transaction>,
        data: &ProtocolData,
        context: &ExecutionContext,
    ) -> Result<BuiltTransaction> {
        let record = data.encode()?;
        self.build(skeleton, &record, context).await
    }
}

fn decode_response(response: &str) -> Result<Transaction> {
    let raw = response.strip_prefix("0x").unwrap_or(response);
    let bytes = hex::decode(raw).map_err(|e| TxError::InvalidResponse(e.to_string()))?;
    Transaction::decode(&bytes).map_err(|e| TxError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::memory::{MemoryCells, MemoryExecutor};
    use crate::capability::Cell;
    use async_trait::async_trait;
    use bytes::Bytes;
    use ckboost_codec::Byte32;
    use ckboost_types::{CellOutput, DepType, HashType, Script};

    fn code_cell() -> OutPoint {
        OutPoint::new(Byte32::from_bytes([0xc0; 32]), 0)
    }

    fn config() -> BuilderConfig {
        BuilderConfig {
            code_cell: code_cell(),
            ..Default::default()
        }
    }

    fn context() -> ExecutionContext {
        ExecutionContext {
            script: Some(Script::new(Byte32::from_bytes([1; 32]), HashType::Type, vec![])),
            cell: None,
        }
    }

    struct Garbage;

    #[async_trait]
    impl ExecutionCapability for Garbage {
        async fn run_script(
            &self,
            _: &OutPoint,
            _: &str,
            _: Vec<String>,
            _: &ExecutionContext,
        ) -> Result<Option<String>> {
            Ok(Some("0xzz".into()))
        }
    }

    #[tokio::test]
    async fn test_executed_path_attaches_code_dep() {
        let executor = Arc::new(MemoryExecutor::new());
        let builder = UpdateTransactionBuilder::new(config()).with_executor(executor.clone());
        let built = builder.build(None, &[1, 2, 3], &context()).await.unwrap();

        assert_eq!(built.mode, BuildMode::Executed);
        assert!(!built.is_degraded());
        assert_eq!(built.tx.raw.outputs_data[0].as_ref(), &[1, 2, 3]);
        assert_eq!(built.tx.raw.cell_deps, vec![CellDep::code(code_cell())]);
        assert_eq!(built.tx.raw.cell_deps[0].dep_type, DepType::Code);

        let calls = executor.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "CKBoostProtocol.update_protocol");
        assert_eq!(calls[0].args[1], "0x010203");
    }

    #[tokio::test]
    async fn test_fallback_without_executor() {
        let builder = UpdateTransactionBuilder::new(config());
        let mut skeleton = Transaction::empty();
        skeleton.witnesses.push(Bytes::from_static(b"w"));
        let built = builder
            .build(Some(skeleton.clone()), &[9], &context())
            .await
            .unwrap();

        assert!(built.is_degraded());
        assert!(built.tx.raw.outputs.is_empty());
        assert_eq!(built.tx.witnesses, skeleton.witnesses);
        assert!(built.tx.has_cell_dep(&CellDep::code(code_cell())));
    }

    #[tokio::test]
    async fn test_unhandled_call_falls_back() {
        let builder = UpdateTransactionBuilder::new(config())
            .with_executor(Arc::new(MemoryExecutor::unhandled()));
        let built = builder.build(None, &[], &context()).await.unwrap();
        assert_eq!(built.mode, BuildMode::Fallback);
        assert_eq!(built.tx.raw.cell_deps.len(), 1);
    }

    #[tokio::test]
    async fn test_code_dep_not_duplicated() {
        let builder = UpdateTransactionBuilder::new(config());
        let mut skeleton = Transaction::empty();
        skeleton.ensure_cell_dep(CellDep::code(code_cell()));
        let built = builder.build(Some(skeleton), &[], &context()).await.unwrap();
        assert_eq!(built.tx.raw.cell_deps.len(), 1);
    }

    #[tokio::test]
    async fn test_execution_error_propagates_unchanged() {
        let builder = UpdateTransactionBuilder::new(config())
            .with_executor(Arc::new(MemoryExecutor::failing("script exited with 5")));
        let err = builder.build(None, &[], &context()).await.unwrap_err();
        assert_eq!(err, TxError::Execution("script exited with 5".into()));
    }

    #[tokio::test]
    async fn test_invalid_response_rejected() {
        let builder = UpdateTransactionBuilder::new(config()).with_executor(Arc::new(Garbage));
        let err = builder.build(None, &[], &context()).await.unwrap_err();
        assert!(matches!(err, TxError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_code_cell() {
        let cells = MemoryCells::new();
        let builder = UpdateTransactionBuilder::new(config()).with_cell_query(cells.clone());
        let err = builder.build(None, &[], &context()).await.unwrap_err();
        assert_eq!(
            err,
            TxError::CodeCellNotFound {
                tx_hash: code_cell().tx_hash,
                index: 0
            }
        );

        cells
            .insert(Cell {
                out_point: code_cell(),
                output: CellOutput {
                    capacity: 0,
                    lock: Script::new(Byte32::ZERO, HashType::Data, vec![]),
                    type_: None,
                },
                output_data: Bytes::new(),
            })
            .await;
        assert!(builder.build(None, &[], &context()).await.is_ok());
    }

    #[tokio::test]
    async fn test_protocol_update_encodes_record() {
        let executor = Arc::new(MemoryExecutor::new());
        let builder = UpdateTransactionBuilder::new(config()).with_executor(executor);
        let data = ProtocolData {
            last_updated: 7,
            ..Default::default()
        };
        let built = builder
            .build_protocol_update(None, &data, &context())
            .await
            .unwrap();
        let written = ProtocolData::decode(&built.tx.raw.outputs_data[0]).unwrap();
        assert_eq!(written, data);
    }

    #[test]
    fn test_config_from_json() {
        let config: BuilderConfig = serde_json::from_str(
            r#"{"codeCell": {"txHash": "0xc0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0", "index": 0}}"#,
        )
        .unwrap();
        assert_eq!(config.method, "CKBoostProtocol.update_protocol");
        assert_eq!(config.code_cell, code_cell());
    }
}
