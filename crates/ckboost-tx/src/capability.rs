//! Boundaries to the outside world: script execution, cell lookup and
//! signing. Each is a trait so the builder and manager can run against a
//! node, a wallet or the in-memory implementations in [`memory`].

use async_trait::async_trait;
use bytes::Bytes;
use ckboost_codec::Byte32;
use ckboost_types::{CellOutput, OutPoint, Script, Transaction};

use crate::error::Result;

/// A live cell as returned by a cell query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub out_point: OutPoint,
    pub output: CellOutput,
    pub output_data: Bytes,
}

/// Extra information an execution capability may use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    /// The script whose cell the method updates.
    pub script: Option<Script>,
    /// The cell currently holding the record, if known.
    pub cell: Option<Cell>,
}

/// Runs a named method of on-chain code and returns a serialized transaction.
#[async_trait]
pub trait ExecutionCapability: Send + Sync {
    /// Run `method` of the code at `code_out_point` with hex arguments.
    ///
    /// `Ok(None)` means the capability did not handle the call.
    async fn run_script(
        &self,
        code_out_point: &OutPoint,
        method: &str,
        args: Vec<String>,
        context: &ExecutionContext,
    ) -> Result<Option<String>>;
}

/// Looks up live cells.
#[async_trait]
pub trait CellQuery: Send + Sync {
    /// All live cells whose type script equals `type_script`.
    async fn find_cells(&self, type_script: &Script) -> Result<Vec<Cell>>;

    /// The live cell at `out_point`, if it exists.
    async fn get_live_cell(&self, out_point: &OutPoint) -> Result<Option<Cell>>;
}

/// Completes fees and submits transactions.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Add inputs, change and witnesses so the transaction can be sent.
    async fn complete_fee(&self, tx: Transaction) -> Result<Transaction>;

    /// Submit and return the transaction hash.
    async fn send_transaction(&self, tx: &Transaction) -> Result<Byte32>;
}

/// In-memory capabilities for tests and local tooling.
pub mod memory {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use ckboost_types::{CellInput, Record};
    use tokio::sync::RwLock;

    use crate::error::TxError;

    /// One recorded `run_script` call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ExecutionCall {
        pub code_out_point: OutPoint,
        pub method: String,
        pub args: Vec<String>,
    }

    #[derive(Debug, Clone)]
    enum Behavior {
        Update { capacity: u64 },
        Unhandled,
        Fail(String),
    }

    /// Execution capability that appends the new record as an output.
    ///
    /// Expects `args = [hex(transaction), hex(record)]`. The output's type
    /// script comes from the context; its lock reuses the type script.
    pub struct MemoryExecutor {
        behavior: Behavior,
        calls: RwLock<Vec<ExecutionCall>>,
    }

    impl MemoryExecutor {
        pub fn new() -> Self {
            Self::with_behavior(Behavior::Update {
                capacity: 1_000_00000000,
            })
        }

        /// An executor that never handles a call.
        pub fn unhandled() -> Self {
            Self::with_behavior(Behavior::Unhandled)
        }

        /// An executor that always fails with `message`.
        pub fn failing(message: impl Into<String>) -> Self {
            Self::with_behavior(Behavior::Fail(message.into()))
        }

        fn with_behavior(behavior: Behavior) -> Self {
            Self {
                behavior,
                calls: RwLock::new(Vec::new()),
            }
        }

        pub async fn calls(&self) -> Vec<ExecutionCall> {
            self.calls.read().await.clone()
        }
    }

    impl Default for MemoryExecutor {
        fn default() -> Self {
            Self::new()
        }
    }

    fn decode_hex_arg(args: &[String], index: usize) -> Result<Vec<u8>> {
        let arg = args
            .get(index)
            .ok_or_else(|| TxError::Execution(format!("missing argument {}", index)))?;
        let raw = arg.strip_prefix("0x").unwrap_or(arg);
        hex::decode(raw).map_err(|e| TxError::Execution(format!("argument {}: {}", index, e)))
    }

    #[async_trait]
    impl ExecutionCapability for MemoryExecutor {
        async fn run_script(
            &self,
            code_out_point: &OutPoint,
            method: &str,
            args: Vec<String>,
            context: &ExecutionContext,
        ) -> Result<Option<String>> {
            self.calls.write().await.push(ExecutionCall {
                code_out_point: *code_out_point,
                method: method.to_string(),
                args: args.clone(),
            });

            let capacity = match &self.behavior {
                Behavior::Unhandled => return Ok(None),
                Behavior::Fail(message) => return Err(TxError::Execution(message.clone())),
                Behavior::Update { capacity } => *capacity,
            };

            let mut tx = Transaction::decode(&decode_hex_arg(&args, 0)?)?;
            let record = decode_hex_arg(&args, 1)?;
            let script = context
                .script
                .clone()
                .ok_or_else(|| TxError::Execution("context has no script".into()))?;

            if let Some(cell) = &context.cell {
                tx.raw.inputs.push(CellInput {
                    since: 0,
                    previous_output: cell.out_point,
                });
            }
            tx.raw.outputs.push(CellOutput {
                capacity,
                lock: script.clone(),
                type_: Some(script),
            });
            tx.raw.outputs_data.push(Bytes::from(record));

            Ok(Some(format!("0x{}", hex::encode(tx.encode()?))))
        }
    }

    /// A set of live cells.
    #[derive(Default)]
    pub struct MemoryCells {
        cells: RwLock<Vec<Cell>>,
    }

    impl MemoryCells {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub async fn insert(&self, cell: Cell) {
            self.cells.write().await.push(cell);
        }

        /// Consume the inputs of `tx` and add its outputs under `tx_hash`.
        pub async fn apply(&self, tx_hash: Byte32, tx: &Transaction) {
            let mut cells = self.cells.write().await;
            cells.retain(|c| {
                !tx.raw
                    .inputs
                    .iter()
                    .any(|input| input.previous_output == c.out_point)
            });
            for (index, output) in tx.raw.outputs.iter().enumerate() {
                cells.push(Cell {
                    out_point: OutPoint::new(tx_hash, index as u32),
                    output: output.clone(),
                    output_data: tx.raw.outputs_data.get(index).cloned().unwrap_or_default(),
                });
            }
        }

        pub async fn count(&self) -> usize {
            self.cells.read().await.len()
        }
    }

    #[async_trait]
    impl CellQuery for MemoryCells {
        async fn find_cells(&self, type_script: &Script) -> Result<Vec<Cell>> {
            Ok(self
                .cells
                .read()
                .await
                .iter()
                .filter(|c| c.output.type_.as_ref() == Some(type_script))
                .cloned()
                .collect())
        }

        async fn get_live_cell(&self, out_point: &OutPoint) -> Result<Option<Cell>> {
            Ok(self
                .cells
                .read()
                .await
                .iter()
                .find(|c| &c.out_point == out_point)
                .cloned())
        }
    }

    /// Signer that fakes fee completion and assigns sequential hashes.
    ///
    /// When linked to a [`MemoryCells`], sent transactions are applied to it.
    pub struct MemorySigner {
        counter: AtomicU64,
        cells: Option<Arc<MemoryCells>>,
        sent: RwLock<Vec<(Byte32, Transaction)>>,
    }

    impl MemorySigner {
        pub fn new() -> Self {
            Self {
                counter: AtomicU64::new(0),
                cells: None,
                sent: RwLock::new(Vec::new()),
            }
        }

        pub fn with_cells(cells: Arc<MemoryCells>) -> Self {
            Self {
                cells: Some(cells),
                ..Self::new()
            }
        }

        pub async fn sent(&self) -> Vec<(Byte32, Transaction)> {
            self.sent.read().await.clone()
        }

        fn next_hash(&self) -> Byte32 {
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            let mut bytes = [0u8; 32];
            bytes[..8].copy_from_slice(&n.to_le_bytes());
            Byte32::from_bytes(bytes)
        }
    }

    impl Default for MemorySigner {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl Signer for MemorySigner {
        async fn complete_fee(&self, mut tx: Transaction) -> Result<Transaction> {
            while tx.witnesses.len() < tx.raw.inputs.len().max(1) {
                tx.witnesses.push(Bytes::new());
            }
            Ok(tx)
        }

        async fn send_transaction(&self, tx: &Transaction) -> Result<Byte32> {
            if tx.witnesses.is_empty() {
                return Err(TxError::Signer("transaction has no witnesses".into()));
            }
            let hash = self.next_hash();
            if let Some(cells) = &self.cells {
                cells.apply(hash, tx).await;
            }
            self.sent.write().await.push((hash, tx.clone()));
            Ok(hash)
        }
    }
}
