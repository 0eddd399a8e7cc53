use crate::store::open_store;
use anyhow::{bail, Context, Result};
use ridefleet_config::FleetConfig;
use ridefleet_coordinator::{recover, run_drainer, Coordinator, CoordinatorConfig, CoordinatorServer, RetryPolicy};
use ridefleet_health::{HealthMonitor, MonitorConfig};
use ridefleet_net::HttpServer;
use ridefleet_participant::{HttpParticipant, Participant};
use ridefleet_router::{Router, RouterConfig};
use ridefleet_txlog::{FileLog, Log, MemoryLog};
use ridefleet_types::Region;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A running coordinator: the 2PC [`Coordinator`], its background health
/// monitor and buffer drainer, the query [`Router`], and the HTTP surface
/// that fronts them all.
pub struct CoordinatorProcess {
    coordinator: Arc<Coordinator>,
    health: Arc<HealthMonitor>,
    server: Arc<CoordinatorServer>,
    listener: HttpServer,
}

impl CoordinatorProcess {
    pub async fn bind(config: &FleetConfig, bind_addr: SocketAddr) -> Result<Self> {
        if config.regions.is_empty() {
            bail!("no regions configured");
        }

        let mut participants: HashMap<Region, Arc<dyn Participant>> = HashMap::new();
        for (name, url) in &config.regions {
            let addr = parse_participant_addr(url)
                .with_context(|| format!("parsing address for region {name}"))?;
            let region = Region::new(name.clone());
            participants.insert(region, Arc::new(HttpParticipant::new(addr, Duration::from_millis(config.handoff.prepare_timeout_ms))));
        }

        let log: Arc<dyn Log> = if config.log.backend == "memory" {
            Arc::new(MemoryLog::new())
        } else {
            Arc::new(FileLog::open(&config.log.backend).context("opening transaction log")?)
        };

        let health = HealthMonitor::new(
            participants.clone(),
            MonitorConfig {
                interval: Duration::from_millis(config.monitor.interval_ms),
                timeout: Duration::from_millis(config.monitor.timeout_ms),
                failure_threshold: config.monitor.failure_threshold,
            },
        );

        let coordinator_config = CoordinatorConfig {
            prepare_timeout: Duration::from_millis(config.handoff.prepare_timeout_ms),
            commit_timeout: Duration::from_millis(config.handoff.commit_timeout_ms),
            overall_timeout: Duration::from_millis(config.handoff.overall_timeout_ms),
            retry: RetryPolicy {
                base: Duration::from_millis(config.handoff.retry.base_ms),
                cap: Duration::from_millis(config.handoff.retry.cap_ms),
                max_attempts: config.handoff.retry.max,
            },
            buffer_max_per_region: config.buffer.max_per_region,
        };

        let coordinator = Coordinator::new(participants.clone(), Arc::clone(&health), log, coordinator_config);

        info!("replaying transaction log for startup recovery");
        recover(&coordinator).await;

        let global_replica = match &config.global_replica {
            Some(descriptor) => Some(open_store("global-replica", descriptor).context("opening global replica")?),
            None => None,
        };
        let router = Arc::new(Router::new(participants, global_replica, Arc::clone(&health), RouterConfig::default()));

        let server = Arc::new(CoordinatorServer::new(Arc::clone(&coordinator), router));
        let listener = HttpServer::bind(bind_addr).await.context("binding coordinator listener")?;

        Ok(Self { coordinator, health, server, listener })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    pub async fn serve(self) -> Result<()> {
        tokio::spawn(Arc::clone(&self.health).run());
        tokio::spawn(run_drainer(Arc::clone(&self.coordinator)));

        info!(addr = %self.local_addr(), "coordinator serving");
        self.listener.serve(self.server).await.context("coordinator listener stopped")
    }
}

/// Parses a region's configured base URL (`"http://host:port"`) into the
/// `SocketAddr` the coordinator dials directly — this system has no DNS
/// resolution layer, so the host segment must already be an IP.
fn parse_participant_addr(url: &str) -> Result<SocketAddr> {
    let stripped = url.trim_start_matches("http://").trim_start_matches("https://");
    stripped
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid region address '{url}', expected host:port"))
}
