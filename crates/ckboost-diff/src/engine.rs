//! Debounced protocol diffing against a fixed baseline.

use std::sync::Arc;

use ckboost_types::ProtocolData;

use crate::debounce::{DebounceConfig, Debouncer, Settled};
use crate::protocol::{diff_protocol, ProtocolChanges, ProtocolStaging};

/// Recomputes the change-set for each staged edit, publishing only the
/// result for the latest one.
pub struct DiffEngine {
    baseline: Arc<ProtocolData>,
    debouncer: Debouncer<ProtocolChanges>,
}

impl DiffEngine {
    pub fn new(baseline: ProtocolData, config: DebounceConfig) -> Self {
        Self {
            baseline: Arc::new(baseline),
            debouncer: Debouncer::new(config),
        }
    }

    pub fn baseline(&self) -> &ProtocolData {
        &self.baseline
    }

    /// Schedule a diff of `staging` against the baseline. Returns its generation.
    pub fn stage(&self, staging: ProtocolStaging) -> u64 {
        let baseline = Arc::clone(&self.baseline);
        self.debouncer
            .trigger(move || diff_protocol(&baseline, &staging))
    }

    /// Wait for the change-set of the latest staged edit.
    pub async fn settled(&self) -> Settled<ProtocolChanges> {
        self.debouncer.settled().await
    }

    /// The last published change-set, if the latest computation succeeded.
    pub fn changes(&self) -> Option<ProtocolChanges> {
        self.debouncer.current().value().cloned()
    }

    /// Replace the baseline after a successful update. Pending results for
    /// the old baseline are superseded.
    pub fn rebase(&mut self, baseline: ProtocolData) {
        let config = *self.debouncer.config();
        self.baseline = Arc::new(baseline);
        self.debouncer = Debouncer::new(config);
    }
}
