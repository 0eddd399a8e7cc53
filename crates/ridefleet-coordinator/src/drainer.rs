use crate::coordinator::Coordinator;
use crate::outcome::OutcomeStatus;
use ridefleet_health::HealthEvent;
use ridefleet_types::{HealthState, Reason, Region};
use std::sync::Arc;
use tracing::{info, warn};

/// Subscribes to health transitions and, on every region recovering to
/// `AVAILABLE`, drains that region's buffer FIFO by re-invoking `Handoff`
/// for each entry. Intended to be spawned once per coordinator process.
pub async fn run(coordinator: Arc<Coordinator>) {
    let mut events = coordinator.health().subscribe();
    loop {
        match events.recv().await {
            Ok(HealthEvent { region, record }) if record.state == HealthState::Available => {
                tokio::spawn(drain_region(Arc::clone(&coordinator), region));
            }
            Ok(_) => {}
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("drainer lagged behind {skipped} health events, resubscribing");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn drain_region(coordinator: Arc<Coordinator>, region: Region) {
    if !coordinator.buffer().start_draining(&region).await {
        return;
    }

    while let Some(mut entry) = coordinator.buffer().pop_front(&region).await {
        entry.attempts += 1;
        let result = coordinator
            .handoff(entry.ride_id.clone(), entry.source.clone(), entry.target.clone())
            .await;

        match result.status {
            OutcomeStatus::Buffered => {
                // Target became unhealthy again between the recovery event
                // and this attempt; leave the rest of the queue alone.
                coordinator.buffer().push_front(entry).await;
                break;
            }
            OutcomeStatus::Aborted if result.reason == Some(Reason::NotFound) => {
                if entry.attempts >= 2 {
                    warn!(
                        ride_id = entry.ride_id.as_str(),
                        attempts = entry.attempts,
                        "discarding buffered handoff: source no longer has the ride"
                    );
                } else {
                    coordinator.buffer().push_back(entry).await;
                }
            }
            OutcomeStatus::Success => {
                info!(ride_id = entry.ride_id.as_str(), %region, "drained buffered handoff");
            }
            _ => {}
        }
    }

    coordinator.buffer().stop_draining(&region).await;
}
