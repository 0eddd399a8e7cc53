use crate::{Ride, RideStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The fixed, minimal filter surface the query router accepts: status set,
/// fare range, time range, and a result limit. Unknown fields are rejected
/// at the boundary by the wire types that embed this struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RideFilter {
    pub status: Option<Vec<RideStatus>>,
    pub min_fare: Option<Decimal>,
    pub max_fare: Option<Decimal>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: usize,
}

impl Default for RideFilter {
    fn default() -> Self {
        Self {
            status: None,
            min_fare: None,
            max_fare: None,
            since: None,
            until: None,
            limit: 100,
        }
    }
}

impl RideFilter {
    /// Result limit clamped to the spec's 1–1000 range regardless of what
    /// the caller asked for.
    pub fn clamped_limit(&self) -> usize {
        self.limit.clamp(1, 1000)
    }

    pub fn matches(&self, ride: &Ride) -> bool {
        if let Some(statuses) = &self.status {
            if !statuses.contains(&ride.status) {
                return false;
            }
        }
        if let Some(min) = self.min_fare {
            if ride.fare < min {
                return false;
            }
        }
        if let Some(max) = self.max_fare {
            if ride.fare > max {
                return false;
            }
        }
        if let Some(since) = self.since {
            if ride.updated_at < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if ride.updated_at > until {
                return false;
            }
        }
        true
    }

    /// Filters, sorts by `updated_at` descending with `ride_id` ascending
    /// as the tie-break (spec invariant: deterministic ordering for a fixed
    /// snapshot), and truncates to the clamped limit.
    pub fn apply(&self, mut rides: Vec<Ride>) -> Vec<Ride> {
        rides.retain(|r| self.matches(r));
        rides.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.ride_id.cmp(&b.ride_id)));
        rides.truncate(self.clamped_limit());
        rides
    }
}
