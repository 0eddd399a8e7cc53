use std::time::Duration;

/// Backoff parameters for retrying a transient participant call, applied
/// per logical call (same `tx_id` on every attempt so idempotence engages).
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(100),
            cap: Duration::from_secs(2),
            max_attempts: 3,
        }
    }
}

/// Timeouts and limits governing one coordinator instance.
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorConfig {
    pub prepare_timeout: Duration,
    pub commit_timeout: Duration,
    pub overall_timeout: Duration,
    pub retry: RetryPolicy,
    pub buffer_max_per_region: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            prepare_timeout: Duration::from_millis(5000),
            commit_timeout: Duration::from_millis(5000),
            overall_timeout: Duration::from_millis(30_000),
            retry: RetryPolicy::default(),
            buffer_max_per_region: 1000,
        }
    }
}
