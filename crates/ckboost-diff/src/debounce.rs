//! Trailing-edge debouncing with a generation guard.
//!
//! Each [`Debouncer::trigger`] bumps a generation counter and spawns a task
//! that sleeps for the window, then computes. A task commits its result only
//! if its generation is still the latest, both before computing and at the
//! moment of publishing, so a superseded computation can never overwrite a
//! newer one. The final trigger before a quiet period always publishes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::DiffError;

/// Debounce timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Quiet period before a computation runs.
    #[serde(with = "millis")]
    pub window: Duration,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_millis(300),
        }
    }
}

/// The published state of a debouncer.
#[derive(Debug, Clone, PartialEq)]
pub enum Settled<T> {
    /// Nothing has been triggered yet.
    Idle,
    /// A computation is scheduled or running.
    Pending { generation: u64 },
    /// The latest computation succeeded.
    Ready { generation: u64, value: T },
    /// The latest computation failed. Any earlier value is gone.
    Failed { generation: u64, message: String },
}

impl<T> Settled<T> {
    pub fn generation(&self) -> Option<u64> {
        match self {
            Settled::Idle => None,
            Settled::Pending { generation }
            | Settled::Ready { generation, .. }
            | Settled::Failed { generation, .. } => Some(*generation),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Settled::Ready { value, .. } => Some(value),
            _ => None,
        }
    }

    fn is_final(&self) -> bool {
        matches!(self, Settled::Ready { .. } | Settled::Failed { .. })
    }
}

/// Coalesces rapid triggers into one trailing computation.
pub struct Debouncer<T> {
    config: DebounceConfig,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<Settled<T>>>,
}

impl<T> Debouncer<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(config: DebounceConfig) -> Self {
        let (tx, _rx) = watch::channel(Settled::Idle);
        Self {
            config,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(tx),
        }
    }

    pub fn config(&self) -> &DebounceConfig {
        &self.config
    }

    /// The most recently issued generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Snapshot of the published state.
    pub fn current(&self) -> Settled<T> {
        self.state.borrow().clone()
    }

    /// Schedule `compute` to run after the window unless superseded.
    ///
    /// Must be called from within a tokio runtime. Returns the generation
    /// assigned to this trigger.
    pub fn trigger<F>(&self, compute: F) -> u64
    where
        F: FnOnce() -> Result<T, DiffError> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(Settled::Pending { generation });

        let latest = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);
        let window = self.config.window;

        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if latest.load(Ordering::SeqCst) != generation {
                tracing::debug!(generation, "debounced computation superseded before start");
                return;
            }

            let settled = match compute() {
                Ok(value) => Settled::Ready { generation, value },
                Err(err) => {
                    tracing::debug!(generation, error = %err, "debounced computation failed");
                    Settled::Failed {
                        generation,
                        message: err.to_string(),
                    }
                }
            };

            let published = state.send_if_modified(|current| {
                if latest.load(Ordering::SeqCst) != generation {
                    return false;
                }
                *current = settled;
                true
            });
            if !published {
                tracing::debug!(generation, "debounced result discarded as stale");
            }
        });

        generation
    }

    /// Wait until the latest generation has published a result.
    ///
    /// Returns immediately with [`Settled::Idle`] if nothing was triggered.
    pub async fn settled(&self) -> Settled<T> {
        let mut rx = self.state.subscribe();
        loop {
            {
                let state = rx.borrow_and_update();
                match &*state {
                    Settled::Idle => return Settled::Idle,
                    s if s.is_final() && s.generation() == Some(self.generation()) => {
                        return s.clone();
                    }
                    _ => {}
                }
            }
            if rx.changed().await.is_err() {
                return self.current();
            }
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
