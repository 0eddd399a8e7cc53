//! Per-region health monitoring: a cooperative probe loop per configured
//! region, a consecutive-failure classification state machine, and a
//! broadcast channel of state transitions for the coordinator's drainer and
//! the query router to subscribe to.

mod monitor;

pub use monitor::{HealthEvent, HealthMonitor, MonitorConfig};
