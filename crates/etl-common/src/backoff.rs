//! Shared exponential backoff retry loop, used by both the source reader's
//! connection retries and the sink writer's HTTP retries. Shaped after a
//! plain loop/inspect/sleep/continue retry — no dedicated backoff crate, so
//! both call sites stay in the same idiom.

use std::future::Future;
use std::time::Duration;

use crate::Error;

#[derive(Debug, Clone, Copy)]
pub struct BackoffConfig {
    pub start: Duration,
    pub factor: u32,
    pub cap: Duration,
}

impl BackoffConfig {
    pub fn new(start: Duration, factor: u32, cap: Duration) -> Self {
        Self { start, factor, cap }
    }
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            start: Duration::from_secs(1),
            factor: 2,
            cap: Duration::from_secs(60),
        }
    }
}

/// Retry `attempt` with exponential backoff for as long as it returns a
/// transient error ([`Error::is_transient`]). Non-transient errors return
/// immediately. Retries are unbounded in count; only the delay is capped.
pub async fn with_backoff<T, F, Fut>(config: BackoffConfig, mut attempt: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let mut delay = config.start;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, delay_ms = delay.as_millis() as u64, "transient error, backing off");
                tokio::time::sleep(delay).await;
                delay = (delay * config.factor).min(config.cap);
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_immediately_when_the_first_attempt_is_ok() {
        let calls = AtomicU32::new(0);
        let result = with_backoff(fast_config(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(42)
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_backoff(fast_config(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(Error::connection("blip"))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn returns_immediately_on_a_fatal_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), Error> = with_backoff(fast_config(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::sql("syntax error")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    fn fast_config() -> BackoffConfig {
        BackoffConfig::new(Duration::from_millis(1), 2, Duration::from_millis(10))
    }
}
