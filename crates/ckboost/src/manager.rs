//! The protocol manager: one loaded protocol cell, staged edits against it,
//! and the round trip that writes the next record on chain.

use std::sync::Arc;

use ckboost_codec::Byte32;
use ckboost_diff::{DebounceConfig, DiffEngine, ProtocolChanges, ProtocolStaging, Settled};
use ckboost_tx::{
    materialize_protocol_data, BuildMode, BuilderConfig, Cell, CellQuery, ExecutionCapability,
    ExecutionContext, Signer, UpdateTransactionBuilder,
};
use ckboost_types::{OutPoint, ProtocolData, Record, Script, Transaction};
use serde::{Deserialize, Serialize};

use crate::error::{BoostError, Result};

/// Configuration for a [`ProtocolManager`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerConfig {
    /// Type script of the protocol cell.
    pub protocol_type_script: Script,
    /// Update-transaction builder settings.
    #[serde(default)]
    pub builder: BuilderConfig,
    /// Debounce settings for change detection.
    #[serde(default)]
    pub debounce: DebounceConfig,
}

impl ManagerConfig {
    pub fn new(protocol_type_script: Script) -> Self {
        Self {
            protocol_type_script,
            builder: BuilderConfig::default(),
            debounce: DebounceConfig::default(),
        }
    }

    /// Parse a deployment descriptor.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Outcome of [`ProtocolManager::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub tx_hash: Byte32,
    pub mode: BuildMode,
    /// The record written on chain. `None` when the transaction was built in
    /// fallback mode and the baseline was kept.
    pub record: Option<ProtocolData>,
}

struct Loaded {
    cell: Cell,
    engine: DiffEngine,
}

/// Loads the protocol cell and drives updates to it.
///
/// The baseline is never edited in place. It is replaced only after a
/// capability-assisted transaction has been sent.
pub struct ProtocolManager {
    config: ManagerConfig,
    cells: Arc<dyn CellQuery>,
    signer: Arc<dyn Signer>,
    builder: UpdateTransactionBuilder,
    loaded: Option<Loaded>,
}

impl ProtocolManager {
    /// Create a manager without an execution capability. Updates built by
    /// it run in fallback mode.
    pub fn new(config: ManagerConfig, cells: Arc<dyn CellQuery>, signer: Arc<dyn Signer>) -> Self {
        let builder = UpdateTransactionBuilder::new(config.builder.clone())
            .with_cell_query(Arc::clone(&cells));
        Self {
            config,
            cells,
            signer,
            builder,
            loaded: None,
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn ExecutionCapability>) -> Self {
        self.builder = self.builder.with_executor(executor);
        self
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Baseline
    // ─────────────────────────────────────────────────────────────────────────

    /// Find the protocol cell and decode its data as the baseline.
    pub async fn load(&mut self) -> Result<&ProtocolData> {
        let mut found = self
            .cells
            .find_cells(&self.config.protocol_type_script)
            .await?;
        if found.len() > 1 {
            tracing::warn!(count = found.len(), "multiple protocol cells, using the first");
        }
        if found.is_empty() {
            return Err(BoostError::ProtocolCellNotFound);
        }
        let cell = found.swap_remove(0);
        let data = ProtocolData::decode(&cell.output_data)?;

        tracing::info!(
            tx_hash = %cell.out_point.tx_hash,
            index = cell.out_point.index,
            last_updated = data.last_updated,
            "loaded protocol cell"
        );

        self.adopt(cell, data);
        self.baseline_ref()
    }

    fn adopt(&mut self, cell: Cell, data: ProtocolData) {
        match &mut self.loaded {
            Some(loaded) => {
                loaded.engine.rebase(data);
                loaded.cell = cell;
            }
            None => {
                self.loaded = Some(Loaded {
                    cell,
                    engine: DiffEngine::new(data, self.config.debounce),
                });
            }
        }
    }

    fn state(&self) -> Result<&Loaded> {
        self.loaded.as_ref().ok_or(BoostError::NotLoaded)
    }

    fn baseline_ref(&self) -> Result<&ProtocolData> {
        Ok(self.state()?.engine.baseline())
    }

    /// The loaded baseline, if any.
    pub fn baseline(&self) -> Option<&ProtocolData> {
        self.loaded.as_ref().map(|l| l.engine.baseline())
    }

    /// Out point of the protocol cell currently treated as live.
    pub fn cell(&self) -> Option<OutPoint> {
        self.loaded.as_ref().map(|l| l.cell.out_point)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Staging
    // ─────────────────────────────────────────────────────────────────────────

    /// A staging area holding the baseline's current values.
    pub fn staging(&self) -> Result<ProtocolStaging> {
        Ok(ProtocolStaging::from_baseline(self.baseline_ref()?))
    }

    /// Stage an edit. The change-set is recomputed after the debounce window.
    pub fn stage(&self, staging: ProtocolStaging) -> Result<u64> {
        Ok(self.state()?.engine.stage(staging))
    }

    /// The last published change-set, if the latest computation succeeded.
    pub fn changes(&self) -> Option<ProtocolChanges> {
        self.loaded.as_ref().and_then(|l| l.engine.changes())
    }

    /// Wait for the change-set of the latest staged edit.
    pub async fn settled(&self) -> Result<ProtocolChanges> {
        match self.state()?.engine.settled().await {
            Settled::Ready { value, .. } => Ok(value),
            Settled::Failed { message, .. } => Err(BoostError::DiffFailed(message)),
            Settled::Idle | Settled::Pending { .. } => Err(BoostError::NothingToUpdate),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submission
    // ─────────────────────────────────────────────────────────────────────────

    /// Write the latest staged state on chain with `last_updated`.
    pub async fn submit(&mut self, last_updated: u64) -> Result<Submission> {
        let baseline_updated = self.baseline_ref()?.last_updated;
        if last_updated <= baseline_updated {
            return Err(BoostError::StaleTimestamp {
                last_updated: baseline_updated,
                attempted: last_updated,
            });
        }

        let changes = self.settled().await?;
        if !changes.has_changed {
            return Err(BoostError::NothingToUpdate);
        }

        let state = self.state()?;
        let next = materialize_protocol_data(state.engine.baseline(), &changes, last_updated)?;
        let context = ExecutionContext {
            script: Some(self.config.protocol_type_script.clone()),
            cell: Some(state.cell.clone()),
        };

        let built = self
            .builder
            .build_protocol_update(None, &next, &context)
            .await?;
        let tx = self.signer.complete_fee(built.tx).await?;
        let tx_hash = self.signer.send_transaction(&tx).await?;

        tracing::info!(
            %tx_hash,
            mode = ?built.mode,
            fields = ?changes.changed_fields(),
            "submitted protocol update"
        );

        if built.mode == BuildMode::Fallback {
            tracing::warn!(%tx_hash, "update sent in fallback mode, baseline kept");
            return Ok(Submission {
                tx_hash,
                mode: built.mode,
                record: None,
            });
        }

        match self.output_cell(tx_hash, &tx) {
            Some(cell) => self.adopt(cell, next.clone()),
            None => {
                tracing::warn!(%tx_hash, "transaction has no protocol output, reload required");
                self.loaded = None;
            }
        }

        Ok(Submission {
            tx_hash,
            mode: built.mode,
            record: Some(next),
        })
    }

    fn output_cell(&self, tx_hash: Byte32, tx: &Transaction) -> Option<Cell> {
        let script = &self.config.protocol_type_script;
        let index = tx
            .raw
            .outputs
            .iter()
            .position(|o| o.type_.as_ref() == Some(script))?;
        Some(Cell {
            out_point: OutPoint::new(tx_hash, index as u32),
            output: tx.raw.outputs[index].clone(),
            output_data: tx.raw.outputs_data.get(index).cloned().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ckboost_tx::capability::memory::{MemoryCells, MemoryExecutor, MemorySigner};
    use ckboost_types::{CellOutput, HashType, ProtocolConfig};

    fn type_script() -> Script {
        Script::new(Byte32::from_bytes([0x70; 32]), HashType::Type, vec![1])
    }

    fn code_cell() -> OutPoint {
        OutPoint::new(Byte32::from_bytes([0xc0; 32]), 0)
    }

    fn baseline() -> ProtocolData {
        ProtocolData {
            last_updated: 100,
            protocol_config: ProtocolConfig {
                admin_lock_hash_vec: vec![Byte32::from_bytes([0xa; 32])],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn seeded() -> Arc<MemoryCells> {
        let cells = MemoryCells::new();
        cells
            .insert(Cell {
                out_point: code_cell(),
                output: CellOutput {
                    capacity: 0,
                    lock: Script::new(Byte32::ZERO, HashType::Data, vec![]),
                    type_: None,
                },
                output_data: Default::default(),
            })
            .await;
        cells
            .insert(Cell {
                out_point: OutPoint::new(Byte32::from_bytes([0x01; 32]), 0),
                output: CellOutput {
                    capacity: 0,
                    lock: type_script(),
                    type_: Some(type_script()),
                },
                output_data: baseline().to_bytes().unwrap(),
            })
            .await;
        cells
    }

    fn config() -> ManagerConfig {
        let mut config = ManagerConfig::new(type_script());
        config.builder.code_cell = code_cell();
        config
    }

    #[tokio::test]
    async fn test_load_missing_cell() {
        let cells = MemoryCells::new();
        let mut manager = ProtocolManager::new(config(), cells, Arc::new(MemorySigner::new()));
        assert!(matches!(manager.load().await, Err(BoostError::ProtocolCellNotFound)));
        assert!(matches!(manager.staging(), Err(BoostError::NotLoaded)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_round_trip() {
        let cells = seeded().await;
        let signer = Arc::new(MemorySigner::with_cells(Arc::clone(&cells)));
        let mut manager = ProtocolManager::new(config(), cells.clone(), signer)
            .with_executor(Arc::new(MemoryExecutor::new()));

        assert_eq!(manager.load().await.unwrap().last_updated, 100);

        let mut staging = manager.staging().unwrap();
        staging.add_admin(Byte32::from_bytes([0xb; 32]));
        manager.stage(staging).unwrap();

        let submission = manager.submit(101).await.unwrap();
        assert_eq!(submission.mode, BuildMode::Executed);
        let record = submission.record.unwrap();
        assert_eq!(record.protocol_config.admin_lock_hash_vec.len(), 2);
        assert_eq!(manager.baseline().unwrap(), &record);
        assert_eq!(manager.cell(), Some(OutPoint::new(submission.tx_hash, 0)));

        // the old protocol cell was consumed
        let live = cells.find_cells(&type_script()).await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(ProtocolData::decode(&live[0].output_data).unwrap(), record);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_rejects_stale_timestamp() {
        let cells = seeded().await;
        let mut manager =
            ProtocolManager::new(config(), cells, Arc::new(MemorySigner::new()));
        manager.load().await.unwrap();
        let err = manager.submit(100).await.unwrap_err();
        assert!(matches!(
            err,
            BoostError::StaleTimestamp {
                last_updated: 100,
                attempted: 100
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_without_changes() {
        let cells = seeded().await;
        let mut manager =
            ProtocolManager::new(config(), cells, Arc::new(MemorySigner::new()));
        manager.load().await.unwrap();
        let staging = manager.staging().unwrap();
        manager.stage(staging).unwrap();
        assert!(matches!(manager.submit(200).await, Err(BoostError::NothingToUpdate)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_keeps_baseline() {
        let cells = seeded().await;
        let mut manager =
            ProtocolManager::new(config(), cells, Arc::new(MemorySigner::new()));
        manager.load().await.unwrap();
        let mut staging = manager.staging().unwrap();
        staging.add_admin(Byte32::from_bytes([0xb; 32]));
        manager.stage(staging).unwrap();

        let submission = manager.submit(101).await.unwrap();
        assert_eq!(submission.mode, BuildMode::Fallback);
        assert!(submission.record.is_none());
        assert_eq!(manager.baseline().unwrap().last_updated, 100);
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "protocolTypeScript": {
                "codeHash": "0x7070707070707070707070707070707070707070707070707070707070707070",
                "hashType": "type",
                "args": "0x01"
            },
            "builder": {
                "codeCell": {
                    "txHash": "0xc0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0",
                    "index": 0
                }
            },
            "debounce": { "window": 50 }
        }"#;
        let config = ManagerConfig::from_json(json).unwrap();
        assert_eq!(config.protocol_type_script, type_script());
        assert_eq!(config.builder.code_cell, code_cell());
        assert_eq!(config.builder.method, "CKBoostProtocol.update_protocol");
        assert_eq!(config.debounce.window.as_millis(), 50);

        assert!(matches!(
            ManagerConfig::from_json("{}"),
            Err(BoostError::Config(_))
        ));
    }
}
