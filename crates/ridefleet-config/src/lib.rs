//! Hierarchical configuration loading: built-in defaults, a project
//! `ridefleet.toml`, a gitignored `ridefleet.local.toml`, then `RIDEFLEET_*`
//! environment variables, each source overriding the last.

mod loader;

pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for a coordinator or region process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Region name -> base URL of that region's participant server.
    pub regions: HashMap<String, String>,
    /// Base URL or store descriptor for the read-only global replica.
    pub global_replica: Option<String>,
    pub log: LogConfig,
    pub monitor: MonitorConfig,
    pub handoff: HandoffConfig,
    pub buffer: BufferConfig,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            regions: HashMap::new(),
            global_replica: None,
            log: LogConfig::default(),
            monitor: MonitorConfig::default(),
            handoff: HandoffConfig::default(),
            buffer: BufferConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Descriptor for durable log storage: `"memory"` or a file path.
    pub backend: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub interval_ms: u64,
    pub timeout_ms: u64,
    pub failure_threshold: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            timeout_ms: 3000,
            failure_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HandoffConfig {
    pub prepare_timeout_ms: u64,
    pub commit_timeout_ms: u64,
    pub overall_timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            prepare_timeout_ms: 5000,
            commit_timeout_ms: 5000,
            overall_timeout_ms: 30_000,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub base_ms: u64,
    pub cap_ms: u64,
    pub max: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_ms: 100,
            cap_ms: 2000,
            max: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    pub max_per_region: u32,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self { max_per_region: 1000 }
    }
}
