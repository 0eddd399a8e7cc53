use chrono::Utc;
use ridefleet_coordinator::{recover, Coordinator, CoordinatorConfig};
use ridefleet_health::{HealthMonitor, MonitorConfig};
use ridefleet_participant::{LocalParticipant, Participant};
use ridefleet_store::{InMemoryStore, Store};
use ridefleet_txlog::{Log, MemoryLog};
use ridefleet_types::{
    HandoffStatus, Region, Ride, RideId, RideStatus, TransactionRecord, TxId, TxState, Vote,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

fn ride(id: &str, region: &str) -> Ride {
    Ride {
        ride_id: RideId::new(id),
        vehicle_id: "v1".into(),
        customer_id: "c1".into(),
        status: RideStatus::InProgress,
        fare: Decimal::new(1200, 2),
        region: Region::new(region),
        start_lat: 0.0,
        start_lon: 0.0,
        current_lat: 0.0,
        current_lon: 0.0,
        end_lat: None,
        end_lon: None,
        updated_at: Utc::now(),
        locked: false,
        transaction_id: None,
        handoff_status: HandoffStatus::None,
    }
}

fn prepared_record(tx_id: &TxId, ride_id: &RideId, source: &Region, target: &Region, snapshot: Ride) -> TransactionRecord {
    let mut record = TransactionRecord::started(tx_id.clone(), ride_id.clone(), source.clone(), target.clone());
    record.state = TxState::Prepared;
    record.source_vote = Some(Vote::Commit);
    record.target_vote = Some(Vote::Commit);
    record.prepared_at = Some(Utc::now());
    record.ride_snapshot = Some(snapshot);
    record
}

async fn build_coordinator(
    source: Region,
    target: Region,
    source_store: Arc<dyn Store>,
    target_store: Arc<dyn Store>,
    log: Arc<dyn Log>,
) -> Arc<Coordinator> {
    let mut participants: HashMap<Region, Arc<dyn Participant>> = HashMap::new();
    participants.insert(source.clone(), Arc::new(LocalParticipant::new(source, source_store)));
    participants.insert(target.clone(), Arc::new(LocalParticipant::new(target, target_store)));
    let health = HealthMonitor::new(participants.clone(), MonitorConfig::default());
    Coordinator::new(participants, health, log, CoordinatorConfig::default())
}

/// Scenario 5: the coordinator crashed after writing the PREPARED record
/// but before either commit call went out. Recovery must finish the
/// handoff: insert on the target, delete on the source, COMMITTED record.
#[tokio::test]
async fn recovers_prepared_crash_before_any_commit() {
    let source_region = Region::new("phoenix");
    let target_region = Region::new("la");
    let tx_id = TxId::new("tx-recover-5");
    let ride_id = RideId::new("r-crash-5");

    let mem = InMemoryStore::new("phoenix-primary");
    let mut locked_ride = ride("r-crash-5", "phoenix");
    locked_ride.locked = true;
    locked_ride.transaction_id = Some(tx_id.clone());
    mem.seed(locked_ride.clone());
    let source_store: Arc<dyn Store> = Arc::new(mem);
    let target_store: Arc<dyn Store> = Arc::new(InMemoryStore::new("la-primary"));

    let log: Arc<dyn Log> = Arc::new(MemoryLog::new());
    log.append(prepared_record(&tx_id, &ride_id, &source_region, &target_region, locked_ride))
        .await
        .unwrap();

    let coordinator = build_coordinator(
        source_region.clone(),
        target_region.clone(),
        Arc::clone(&source_store),
        Arc::clone(&target_store),
        Arc::clone(&log),
    )
    .await;

    recover(&coordinator).await;

    assert!(source_store.get_ride(&ride_id).await.unwrap().is_none());
    let landed = target_store.get_ride(&ride_id).await.unwrap().unwrap();
    assert_eq!(landed.region, target_region);
    assert_eq!(landed.handoff_status, HandoffStatus::Completed);
    assert!(!landed.locked);

    let record = log.get(&tx_id).await.unwrap().unwrap();
    assert_eq!(record.state, TxState::Committed);
}

/// Scenario 6: the coordinator crashed after the target commit landed but
/// before the source delete ran. The target commit is idempotent on
/// replay (same region, ride already present) and the source side still
/// needs its delete.
#[tokio::test]
async fn recovers_prepared_crash_after_target_commit_before_source_delete() {
    let source_region = Region::new("phoenix");
    let target_region = Region::new("la");
    let tx_id = TxId::new("tx-recover-6");
    let ride_id = RideId::new("r-crash-6");

    let mem = InMemoryStore::new("phoenix-primary");
    let mut locked_ride = ride("r-crash-6", "phoenix");
    locked_ride.locked = true;
    locked_ride.transaction_id = Some(tx_id.clone());
    mem.seed(locked_ride.clone());
    let source_store: Arc<dyn Store> = Arc::new(mem);

    let target_mem = InMemoryStore::new("la-primary");
    let mut landed_ride = locked_ride.clone();
    landed_ride.region = target_region.clone();
    landed_ride.handoff_status = HandoffStatus::Completed;
    landed_ride.locked = false;
    landed_ride.transaction_id = None;
    target_mem.seed(landed_ride);
    let target_store: Arc<dyn Store> = Arc::new(target_mem);

    let log: Arc<dyn Log> = Arc::new(MemoryLog::new());
    log.append(prepared_record(&tx_id, &ride_id, &source_region, &target_region, locked_ride))
        .await
        .unwrap();

    let coordinator = build_coordinator(
        source_region.clone(),
        target_region.clone(),
        Arc::clone(&source_store),
        Arc::clone(&target_store),
        Arc::clone(&log),
    )
    .await;

    recover(&coordinator).await;

    assert!(source_store.get_ride(&ride_id).await.unwrap().is_none());
    let landed = target_store.get_ride(&ride_id).await.unwrap().unwrap();
    assert_eq!(landed.region, target_region);

    let record = log.get(&tx_id).await.unwrap().unwrap();
    assert_eq!(record.state, TxState::Committed);
}

/// A STARTED record with no PREPARED follow-up (crash before the target
/// prepare ever ran) is always aborted on both sides — it never promised
/// the target anything.
#[tokio::test]
async fn recovers_started_crash_by_aborting_both_sides() {
    let source_region = Region::new("phoenix");
    let target_region = Region::new("la");
    let tx_id = TxId::new("tx-recover-started");
    let ride_id = RideId::new("r-crash-started");

    let mem = InMemoryStore::new("phoenix-primary");
    let mut locked_ride = ride("r-crash-started", "phoenix");
    locked_ride.locked = true;
    locked_ride.transaction_id = Some(tx_id.clone());
    mem.seed(locked_ride);
    let source_store: Arc<dyn Store> = Arc::new(mem);
    let target_store: Arc<dyn Store> = Arc::new(InMemoryStore::new("la-primary"));

    let log: Arc<dyn Log> = Arc::new(MemoryLog::new());
    log.append(TransactionRecord::started(
        tx_id.clone(),
        ride_id.clone(),
        source_region.clone(),
        target_region.clone(),
    ))
    .await
    .unwrap();

    let coordinator = build_coordinator(
        source_region,
        target_region,
        Arc::clone(&source_store),
        Arc::clone(&target_store),
        Arc::clone(&log),
    )
    .await;

    recover(&coordinator).await;

    let ride = source_store.get_ride(&ride_id).await.unwrap().unwrap();
    assert!(!ride.locked);
    assert!(ride.transaction_id.is_none());

    let record = log.get(&tx_id).await.unwrap().unwrap();
    assert_eq!(record.state, TxState::Aborted);
}

/// A PREPARED record where the source voted abort must resolve by
/// aborting both sides rather than committing.
#[tokio::test]
async fn recovers_prepared_with_abort_vote_by_aborting_both_sides() {
    let source_region = Region::new("phoenix");
    let target_region = Region::new("la");
    let tx_id = TxId::new("tx-recover-abort");
    let ride_id = RideId::new("r-crash-abort");

    let source_store: Arc<dyn Store> = Arc::new(InMemoryStore::new("phoenix-primary"));
    let target_store: Arc<dyn Store> = Arc::new(InMemoryStore::new("la-primary"));

    let log: Arc<dyn Log> = Arc::new(MemoryLog::new());
    let mut record = TransactionRecord::started(tx_id.clone(), ride_id.clone(), source_region.clone(), target_region.clone());
    record.state = TxState::Prepared;
    record.source_vote = Some(Vote::Abort);
    record.target_vote = Some(Vote::Commit);
    record.prepared_at = Some(Utc::now());
    log.append(record).await.unwrap();

    let coordinator = build_coordinator(
        source_region,
        target_region,
        Arc::clone(&source_store),
        Arc::clone(&target_store),
        Arc::clone(&log),
    )
    .await;

    recover(&coordinator).await;

    let record = log.get(&tx_id).await.unwrap().unwrap();
    assert_eq!(record.state, TxState::Aborted);
}
