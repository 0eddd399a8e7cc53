use crate::{Region, TxId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a ride, stable across region handoffs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RideId(String);

impl RideId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RideId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle status of a ride, independent of handoff state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl RideStatus {
    /// The wire representation, matching this type's own
    /// `SCREAMING_SNAKE_CASE` serde rename so callers building ad hoc
    /// string keys (stats breakdowns, log fields) don't diverge from the
    /// JSON body's own spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// In-handoff status recorded on the ride document itself.
///
/// Empty in the common case; `Preparing` while the region holds a lock for
/// an in-flight transaction; `Completed` immediately after a target region
/// accepts a committed insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HandoffStatus {
    None,
    Preparing,
    Completed,
}

impl Default for HandoffStatus {
    fn default() -> Self {
        Self::None
    }
}

/// A single autonomous-vehicle ride record.
///
/// Invariants (enforced by the owning [`crate::Role::Source`]/target region
/// store, never by this struct alone):
/// - at most one region holds a given `ride_id` outside an in-flight
///   transaction window
/// - `locked == true` implies `transaction_id.is_some()`
/// - `region` matches the region that is actually storing the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub ride_id: RideId,
    pub vehicle_id: String,
    pub customer_id: String,
    pub status: RideStatus,
    pub fare: Decimal,
    pub region: Region,
    pub start_lat: f64,
    pub start_lon: f64,
    pub current_lat: f64,
    pub current_lon: f64,
    pub end_lat: Option<f64>,
    pub end_lon: Option<f64>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub transaction_id: Option<TxId>,
    #[serde(default)]
    pub handoff_status: HandoffStatus,
}

impl Ride {
    /// True if this document is currently under a handoff lock.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// True if `tx_id` is the transaction currently holding this ride's lock.
    pub fn is_locked_by(&self, tx_id: &TxId) -> bool {
        self.locked && self.transaction_id.as_ref() == Some(tx_id)
    }
}
