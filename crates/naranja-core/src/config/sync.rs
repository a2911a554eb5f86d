//! Assignment synchronization policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Controls how role-derived assignments are reconciled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Remove obsolete role-derived assignments even when already completed.
    ///
    /// Off by default so completion history survives curriculum changes.
    #[serde(default)]
    pub prune_completed: bool,
    /// Extra attempts for a single store operation after a transient failure.
    #[serde(default = "default_transient_retries")]
    pub transient_retries: u32,
    /// Delay before the first retry; doubles on each further attempt.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    /// Number of users synced concurrently during a role batch.
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
}

impl SyncConfig {
    /// Backoff before retry number `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(8);
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            prune_completed: false,
            transient_retries: default_transient_retries(),
            retry_backoff_ms: default_retry_backoff(),
            batch_concurrency: default_batch_concurrency(),
        }
    }
}

fn default_transient_retries() -> u32 {
    1
}

fn default_retry_backoff() -> u64 {
    200
}

fn default_batch_concurrency() -> usize {
    4
}
