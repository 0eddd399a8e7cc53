use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification of a region's reachability, as tracked by the health
/// monitor. A region starts `Unknown` until the first probe completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthState {
    Available,
    Unavailable,
    Unknown,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Health monitor's view of a single region, refreshed by probes only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub state: HealthState,
    pub consecutive_failures: u32,
    pub last_ok_at: Option<DateTime<Utc>>,
    pub last_latency_ms: Option<u64>,
    pub primary_id: Option<String>,
    pub replication_lag_ms: Option<u64>,
}

impl Default for HealthRecord {
    fn default() -> Self {
        Self {
            state: HealthState::Unknown,
            consecutive_failures: 0,
            last_ok_at: None,
            last_latency_ms: None,
            primary_id: None,
            replication_lag_ms: None,
        }
    }
}

impl HealthRecord {
    pub fn is_available(&self) -> bool {
        self.state == HealthState::Available
    }
}
