use chrono::Utc;
use ridefleet_participant::Participant;
use ridefleet_types::{HealthRecord, HealthState, Region};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Probe cadence and failure classification, loaded from
/// `monitor.intervalMs` / `monitor.timeoutMs` / `monitor.failureThreshold`.
#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub timeout: Duration,
    pub failure_threshold: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            timeout: Duration::from_millis(3000),
            failure_threshold: 3,
        }
    }
}

/// A state transition published to subscribers. Only transitions are sent,
/// never every probe tick — callers wanting the current state at any moment
/// should call [`HealthMonitor::snapshot`] instead.
#[derive(Debug, Clone)]
pub struct HealthEvent {
    pub region: Region,
    pub record: HealthRecord,
}

/// Runs one probe loop covering every configured region, classifying each
/// region's reachability and publishing transitions on a broadcast channel.
///
/// The monitor never blocks a caller: [`HealthMonitor::snapshot`] and
/// [`HealthMonitor::is_unavailable`] read a `RwLock`-guarded table that the
/// probe loop updates independently.
pub struct HealthMonitor {
    participants: HashMap<Region, Arc<dyn Participant>>,
    state: RwLock<HashMap<Region, HealthRecord>>,
    failure_counts: RwLock<HashMap<Region, u64>>,
    events: broadcast::Sender<HealthEvent>,
    config: MonitorConfig,
}

impl HealthMonitor {
    pub fn new(participants: HashMap<Region, Arc<dyn Participant>>, config: MonitorConfig) -> Arc<Self> {
        let state = participants
            .keys()
            .cloned()
            .map(|region| (region, HealthRecord::default()))
            .collect();
        let (events, _rx) = broadcast::channel(1024);
        Arc::new(Self {
            participants,
            state: RwLock::new(state),
            failure_counts: RwLock::new(HashMap::new()),
            events,
            config,
        })
    }

    /// Cumulative failed probes for a region since this monitor started,
    /// unlike [`HealthRecord::consecutive_failures`] which resets to zero on
    /// the next successful probe. Used for the `health_probe_failures_total`
    /// metric.
    pub fn probe_failures_total(&self, region: &Region) -> u64 {
        self.failure_counts.read().unwrap().get(region).copied().unwrap_or(0)
    }

    /// Every region this monitor tracks, in no particular order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.participants.keys()
    }

    /// Subscribes to state-transition events. The receiver is guaranteed to
    /// observe every transition from the point of subscription, or a
    /// `Lagged` error if it falls too far behind; it can always recover the
    /// current state via [`HealthMonitor::snapshot`].
    pub fn subscribe(&self) -> broadcast::Receiver<HealthEvent> {
        self.events.subscribe()
    }

    /// Current view of every region's health record.
    pub fn snapshot(&self) -> HashMap<Region, HealthRecord> {
        self.state.read().unwrap().clone()
    }

    /// Single-region read used by the coordinator's health gate and the
    /// router's `local` scope.
    pub fn record(&self, region: &Region) -> Option<HealthRecord> {
        self.state.read().unwrap().get(region).cloned()
    }

    /// True only once the region has crossed the failure threshold.
    /// `UNKNOWN` (no probe completed yet) is deliberately not unavailable —
    /// the coordinator proceeds optimistically until a probe says otherwise.
    pub fn is_unavailable(&self, region: &Region) -> bool {
        self.state
            .read()
            .unwrap()
            .get(region)
            .is_some_and(|r| r.state == HealthState::Unavailable)
    }

    /// Runs the probe loop forever. Intended to be spawned as a background
    /// task once per process.
    pub async fn run(self: Arc<Self>) {
        let mut tick = tokio::time::interval(self.config.interval);
        loop {
            tick.tick().await;
            self.probe_all().await;
        }
    }

    async fn probe_all(&self) {
        let mut set = tokio::task::JoinSet::new();
        for (region, participant) in &self.participants {
            let region = region.clone();
            let participant = Arc::clone(participant);
            let timeout = self.config.timeout;
            set.spawn(async move {
                let started = tokio::time::Instant::now();
                let outcome = tokio::time::timeout(timeout, participant.health()).await;
                (region, outcome, started.elapsed())
            });
        }

        while let Some(joined) = set.join_next().await {
            let Ok((region, outcome, elapsed)) = joined else {
                continue;
            };
            self.apply_probe_result(region, outcome, elapsed);
        }
    }

    fn apply_probe_result(
        &self,
        region: Region,
        outcome: Result<
            Result<ridefleet_store::StoreHealth, ridefleet_types::FleetError>,
            tokio::time::error::Elapsed,
        >,
        elapsed: Duration,
    ) {
        let transition = {
            let mut state = self.state.write().unwrap();
            let record = state.entry(region.clone()).or_default();
            let was_unavailable = record.state == HealthState::Unavailable;

            match outcome {
                Ok(Ok(health)) => {
                    record.state = HealthState::Available;
                    record.consecutive_failures = 0;
                    record.last_ok_at = Some(Utc::now());
                    record.last_latency_ms = Some(elapsed.as_millis() as u64);
                    record.primary_id = Some(health.primary_id);
                    record.replication_lag_ms = Some(health.replication_lag_ms);
                    was_unavailable.then(|| record.clone())
                }
                Ok(Err(e)) => self.note_failure(record, &region, e.to_string()),
                Err(_) => self.note_failure(record, &region, "probe timed out".to_string()),
            }
        };

        if let Some(record) = transition {
            let recovered = record.state == HealthState::Available;
            if recovered {
                info!(region = region.as_str(), "region recovered, marking AVAILABLE");
            } else {
                warn!(region = region.as_str(), "region marked UNAVAILABLE");
            }
            self.publish(region, record);
        }
    }

    /// Bumps the failure count and flips to `UNAVAILABLE` on crossing the
    /// threshold. Returns the record to publish if this probe caused a
    /// fresh transition into `UNAVAILABLE`.
    fn note_failure(&self, record: &mut HealthRecord, region: &Region, reason: String) -> Option<HealthRecord> {
        let was_unavailable = record.state == HealthState::Unavailable;
        record.consecutive_failures += 1;
        *self.failure_counts.write().unwrap().entry(region.clone()).or_insert(0) += 1;
        warn!(
            region = region.as_str(),
            consecutive_failures = record.consecutive_failures,
            "health probe failed: {reason}"
        );

        if !was_unavailable && record.consecutive_failures >= self.config.failure_threshold {
            record.state = HealthState::Unavailable;
            Some(record.clone())
        } else {
            None
        }
    }

    fn publish(&self, region: Region, record: HealthRecord) {
        let _ = self.events.send(HealthEvent { region, record });
    }
}
