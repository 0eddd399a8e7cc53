use crate::config::RouterConfig;
use crate::result::SearchResult;
use crate::scope::Scope;
use ridefleet_health::HealthMonitor;
use ridefleet_participant::Participant;
use ridefleet_store::Store;
use ridefleet_types::{FleetError, Region, Ride, RideFilter};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Dispatches a search to one of three scopes (spec section 4.F):
/// `local` forwards to a single participant, `global-fast` reads the
/// eventually-consistent global replica, `global-live` fans out to every
/// region and merges.
pub struct Router {
    participants: HashMap<Region, Arc<dyn Participant>>,
    global_replica: Option<Arc<dyn Store>>,
    health: Arc<HealthMonitor>,
    config: RouterConfig,
}

impl Router {
    pub fn new(
        participants: HashMap<Region, Arc<dyn Participant>>,
        global_replica: Option<Arc<dyn Store>>,
        health: Arc<HealthMonitor>,
        config: RouterConfig,
    ) -> Self {
        Self {
            participants,
            global_replica,
            health,
            config,
        }
    }

    pub async fn search(&self, scope: Scope, region: Option<Region>, filter: RideFilter) -> Result<SearchResult, FleetError> {
        let started = Instant::now();
        match scope {
            Scope::Local => self.search_local(region, filter, started).await,
            Scope::GlobalFast => self.search_global_fast(filter, started).await,
            Scope::GlobalLive => self.search_global_live(filter, started).await,
        }
    }

    async fn search_local(&self, region: Option<Region>, filter: RideFilter, started: Instant) -> Result<SearchResult, FleetError> {
        let region = region.ok_or_else(|| FleetError::InvalidArgument("local scope requires a region".into()))?;
        let participant = self
            .participants
            .get(&region)
            .ok_or_else(|| FleetError::InvalidArgument(format!("unknown region {region}")))?;

        let results = tokio::time::timeout(self.config.per_call_timeout, participant.search(&filter))
            .await
            .map_err(|_| FleetError::Unavailable(format!("{region} search timed out")))??;

        Ok(SearchResult {
            results,
            latency_ms: elapsed_ms(started),
            regions_queried: vec![region],
            warnings: Vec::new(),
        })
    }

    async fn search_global_fast(&self, filter: RideFilter, started: Instant) -> Result<SearchResult, FleetError> {
        let replica = self
            .global_replica
            .as_ref()
            .ok_or_else(|| FleetError::Unavailable("no global replica configured".into()))?;

        let rides = tokio::time::timeout(self.config.per_call_timeout, replica.list_rides())
            .await
            .map_err(|_| FleetError::Unavailable("global replica timed out".into()))?
            .map_err(FleetError::from)?;

        Ok(SearchResult {
            results: filter.apply(rides),
            latency_ms: elapsed_ms(started),
            regions_queried: Vec::new(),
            warnings: Vec::new(),
        })
    }

    async fn search_global_live(&self, filter: RideFilter, started: Instant) -> Result<SearchResult, FleetError> {
        if self.participants.is_empty() {
            return Err(FleetError::InvalidArgument("no regions configured".into()));
        }

        let mut set = tokio::task::JoinSet::new();
        for (region, participant) in &self.participants {
            let region = region.clone();
            let participant = Arc::clone(participant);
            let filter = filter.clone();
            let per_call = self.config.per_call_timeout;
            set.spawn(async move {
                let outcome = tokio::time::timeout(per_call, participant.search(&filter)).await;
                (region, outcome)
            });
        }

        let mut regions_queried = Vec::new();
        let mut warnings = Vec::new();
        let mut merged: HashMap<ridefleet_types::RideId, Ride> = HashMap::new();
        let mut attempted = 0usize;

        let deadline = tokio::time::sleep(self.config.global_deadline);
        tokio::pin!(deadline);
        loop {
            tokio::select! {
                joined = set.join_next() => {
                    let Some(joined) = joined else { break };
                    attempted += 1;
                    let Ok((region, outcome)) = joined else { continue };
                    match outcome {
                        Ok(Ok(rides)) => {
                            regions_queried.push(region);
                            for ride in rides {
                                merge_prefer_latest(&mut merged, ride);
                            }
                        }
                        Ok(Err(e)) => {
                            warn!(region = region.as_str(), "global-live search failed: {e}");
                            warnings.push(format!("{region}: {e}"));
                        }
                        Err(_) => {
                            warn!(region = region.as_str(), "global-live search timed out");
                            warnings.push(format!("{region}: timed out"));
                        }
                    }
                }
                () = &mut deadline => {
                    warn!("global-live search hit the global deadline with results outstanding");
                    warnings.push("global deadline exceeded before every region responded".to_string());
                    break;
                }
            }
        }

        if regions_queried.is_empty() && attempted == self.participants.len() {
            return Err(FleetError::Unavailable("every region failed the global-live search".into()));
        }

        let merged_rides: Vec<Ride> = merged.into_values().collect();
        Ok(SearchResult {
            results: filter.apply(merged_rides),
            latency_ms: elapsed_ms(started),
            regions_queried,
            warnings,
        })
    }

    /// True if the router should annotate a result with a staleness
    /// warning because the queried region is currently `UNAVAILABLE`.
    pub fn region_is_stale(&self, region: &Region) -> bool {
        self.health.is_unavailable(region)
    }
}

fn merge_prefer_latest(merged: &mut HashMap<ridefleet_types::RideId, Ride>, ride: Ride) {
    match merged.get(&ride.ride_id) {
        Some(existing) if existing.updated_at >= ride.updated_at => {}
        _ => {
            merged.insert(ride.ride_id.clone(), ride);
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
