//! Shared types for the ride fleet handoff system.
//!
//! Defines the data model common to every component: regions, rides,
//! transaction records, buffer entries, health records, and the error
//! taxonomy used at every crate boundary.

mod error;
mod filter;
mod health;
mod ride;
mod transaction;

pub use error::{FleetError, Reason};
pub use filter::RideFilter;
pub use health::{HealthRecord, HealthState};
pub use ride::{HandoffStatus, Ride, RideId, RideStatus};
pub use transaction::{BufferEntry, Role, TransactionRecord, TxId, TxState, Vote};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a region (e.g. `"us-west"`). Also used as the global replica's
/// pseudo-region tag in query results.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Region(String);

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Region {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Region {
    fn from(value: String) -> Self {
        Self(value)
    }
}
