use crate::config::RetryPolicy;
use ridefleet_types::FleetError;
use std::future::Future;

/// Retries `call` with exponential backoff until it succeeds or
/// `policy.max_attempts` is reached, whichever comes first. Every attempt
/// must carry the same idempotency key on the caller's side; this helper
/// only controls timing.
pub async fn retry_with_backoff<F, Fut, T>(policy: &RetryPolicy, mut call: F) -> Result<T, FleetError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FleetError>>,
{
    let mut attempt = 0u32;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    return Err(err);
                }
                let delay = policy.base.saturating_mul(1 << (attempt - 1)).min(policy.cap);
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn succeeds_without_retry() {
        let policy = RetryPolicy {
            base: Duration::from_millis(1),
            cap: Duration::from_millis(10),
            max_attempts: 3,
        };
        let calls = AtomicU32::new(0);
        let result: Result<u32, FleetError> = retry_with_backoff(&policy, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let policy = RetryPolicy {
            base: Duration::from_millis(1),
            cap: Duration::from_millis(5),
            max_attempts: 3,
        };
        let calls = AtomicU32::new(0);
        let result: Result<u32, FleetError> = retry_with_backoff(&policy, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FleetError::Unavailable("down".into()))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn recovers_after_transient_failure() {
        let policy = RetryPolicy {
            base: Duration::from_millis(1),
            cap: Duration::from_millis(5),
            max_attempts: 3,
        };
        let calls = AtomicU32::new(0);
        let result: Result<u32, FleetError> = retry_with_backoff(&policy, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                Err(FleetError::Unavailable("down".into()))
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
    }
}
