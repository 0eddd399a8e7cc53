//! JSON request/response shapes for the participant HTTP surface
//! (spec section 6). Every request type rejects unknown fields at the
//! boundary.

use ridefleet_types::{Ride, RideFilter, Role, TxId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrepareRequest {
    pub tx_id: TxId,
    pub ride_id: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrepareResponse {
    pub vote: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ride: Option<Ride>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitRequest {
    pub tx_id: TxId,
    pub ride_id: String,
    pub role: Role,
    #[serde(default)]
    pub ride: Option<Ride>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommitResponse {
    pub committed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AbortRequest {
    pub tx_id: TxId,
    pub ride_id: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AbortResponse {
    pub aborted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub present: bool,
    pub locked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub region: String,
    pub primary: String,
    pub replication_lag_ms: u64,
    pub last_write_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total: u64,
    pub by_status: std::collections::HashMap<String, u64>,
    pub avg_fare: String,
    pub replication_lag_ms: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub reason: String,
    pub message: String,
}

/// A region's local read endpoint, forwarded to by the query router's
/// `local` and `global-live` scopes. The request body is a [`RideFilter`]
/// directly, which already rejects unknown fields.
pub type SearchRequest = RideFilter;

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<Ride>,
}
