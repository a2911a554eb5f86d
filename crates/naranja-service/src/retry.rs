//! Bounded retry of store operations that failed transiently.

use std::future::Future;

use tracing::warn;

use naranja_core::config::SyncConfig;
use naranja_core::result::AppResult;

/// Run `op`, retrying up to `config.transient_retries` extra times while it
/// fails with a retryable error.
///
/// Non-retryable errors and the last transient error are returned as is.
pub async fn with_retry<T, F, Fut>(config: &SyncConfig, operation: &str, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < config.transient_retries => {
                attempt += 1;
                let delay = config.backoff_for(attempt);
                warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient store failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
