use ridefleet_types::{Region, Ride};

/// Outcome of one `search` call across any scope.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub results: Vec<Ride>,
    pub latency_ms: u64,
    pub regions_queried: Vec<Region>,
    pub warnings: Vec<String>,
}
