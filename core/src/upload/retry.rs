use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::SinkError;

/// Exponential backoff bounded by `max_attempts` and capped at
/// `max_delay_ms`. Attempt numbering starts at 0.
pub fn next_delay(cfg: &RetryConfig, attempt: u32) -> Option<Duration> {
    if attempt + 1 >= cfg.max_attempts {
        return None;
    }
    let exp = 1u64 << attempt.min(30);
    let delay = cfg.base_delay_ms.saturating_mul(exp);
    Some(Duration::from_millis(delay.min(cfg.max_delay_ms)))
}

/// Run one network call with bounded retries. Non-retryable errors and
/// exhausted attempts surface the last error; retries are confined to this
/// single call, never the surrounding pipeline.
pub async fn with_retry<T, F, Fut>(
    cfg: &RetryConfig,
    op_name: &str,
    mut op: F,
) -> Result<T, SinkError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SinkError>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(e) if e.is_retryable() => match next_delay(cfg, attempt) {
                Some(delay) => {
                    tracing::warn!(
                        op = op_name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after: {e}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                None => return Err(e),
            },
            Err(e) => return Err(e),
        }
    }
}
