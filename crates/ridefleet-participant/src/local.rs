use crate::trait_def::{Participant, PrepareOutcome, StatusOutcome};
use async_trait::async_trait;
use ridefleet_store::{Store, StoreError, StoreHealth};
use ridefleet_types::{FleetError, HandoffStatus, Reason, Ride, RideFilter, RideId, Role, TxId, Vote};
use std::sync::Arc;
use tracing::{info, warn};

/// An in-process region participant backed directly by a [`Store`]. Used
/// for tests and for single-binary demos that run every region in one
/// process; production deployments reach remote regions through
/// [`crate::HttpParticipant`] instead.
pub struct LocalParticipant {
    region: ridefleet_types::Region,
    store: Arc<dyn Store>,
}

impl LocalParticipant {
    pub fn new(region: ridefleet_types::Region, store: Arc<dyn Store>) -> Self {
        Self { region, store }
    }
}

#[async_trait]
impl Participant for LocalParticipant {
    async fn prepare(
        &self,
        tx_id: &TxId,
        ride_id: &RideId,
        role: Role,
    ) -> Result<PrepareOutcome, FleetError> {
        match role {
            Role::Source => match self.store.lock(ride_id, tx_id).await {
                Ok(ride) => Ok(PrepareOutcome {
                    vote: Vote::Commit,
                    reason: None,
                    ride: Some(ride),
                }),
                Err(StoreError::NotFound(_)) => Ok(PrepareOutcome {
                    vote: Vote::Abort,
                    reason: Some(Reason::NotFound),
                    ride: None,
                }),
                Err(StoreError::AlreadyLocked(_)) => Ok(PrepareOutcome {
                    vote: Vote::Abort,
                    reason: Some(Reason::Contested),
                    ride: None,
                }),
                Err(e) => Err(e.into()),
            },
            Role::Target => match self.store.get_ride(ride_id).await? {
                Some(ride) if ride.transaction_id.as_ref() == Some(tx_id) => Ok(PrepareOutcome {
                    vote: Vote::Commit,
                    reason: None,
                    ride: Some(ride),
                }),
                Some(_) => Ok(PrepareOutcome {
                    vote: Vote::Abort,
                    reason: Some(Reason::Duplicate),
                    ride: None,
                }),
                None => Ok(PrepareOutcome {
                    vote: Vote::Commit,
                    reason: None,
                    ride: None,
                }),
            },
        }
    }

    async fn commit(
        &self,
        tx_id: &TxId,
        ride_id: &RideId,
        role: Role,
        ride_snapshot: Option<Ride>,
    ) -> Result<(), FleetError> {
        match role {
            Role::Source => {
                self.store.delete_ride(ride_id, tx_id).await?;
                info!(ride_id = %ride_id, tx_id = %tx_id, "source commit: ride deleted");
                Ok(())
            }
            Role::Target => {
                let mut ride = ride_snapshot.ok_or_else(|| {
                    FleetError::InvalidArgument("target commit missing ride snapshot".into())
                })?;
                ride.region = self.region.clone();
                ride.handoff_status = HandoffStatus::Completed;
                ride.locked = false;
                ride.transaction_id = None;

                match self.store.insert_ride(ride).await {
                    Ok(()) => {
                        info!(ride_id = %ride_id, tx_id = %tx_id, "target commit: ride inserted");
                        Ok(())
                    }
                    Err(StoreError::AlreadyExists(_)) => {
                        let existing = self.store.get_ride(ride_id).await?;
                        match existing {
                            Some(existing) if existing.region == self.region => Ok(()),
                            _ => Err(FleetError::Internal(format!(
                                "target commit conflict for ride {ride_id}"
                            ))),
                        }
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    async fn abort(&self, tx_id: &TxId, ride_id: &RideId, role: Role) -> Result<(), FleetError> {
        match role {
            Role::Source => {
                self.store.unlock(ride_id, tx_id).await?;
                Ok(())
            }
            Role::Target => {
                if let Some(ride) = self.store.get_ride(ride_id).await? {
                    if ride.transaction_id.as_ref() == Some(tx_id) {
                        self.store.delete_ride(ride_id, tx_id).await?;
                    } else {
                        warn!(
                            ride_id = %ride_id,
                            tx_id = %tx_id,
                            "abort on target skipped: ride belongs to a different transaction"
                        );
                    }
                }
                Ok(())
            }
        }
    }

    async fn status(&self, tx_id: &TxId) -> Result<StatusOutcome, FleetError> {
        let ride = self.store.find_by_transaction(tx_id).await?;
        Ok(StatusOutcome {
            present: ride.is_some(),
            locked: ride.map(|r| r.locked).unwrap_or(false),
        })
    }

    async fn health(&self) -> Result<StoreHealth, FleetError> {
        Ok(self.store.health().await?)
    }

    async fn search(&self, filter: &RideFilter) -> Result<Vec<Ride>, FleetError> {
        let rides = self.store.list_rides().await?;
        Ok(filter.apply(rides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ridefleet_store::InMemoryStore;
    use ridefleet_types::{Region, RideStatus};
    use rust_decimal::Decimal;

    fn ride(id: &str, region: &str) -> Ride {
        Ride {
            ride_id: RideId::new(id),
            vehicle_id: "v1".into(),
            customer_id: "c1".into(),
            status: RideStatus::InProgress,
            fare: Decimal::new(1000, 2),
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

    #[tokio::test]
    async fn source_prepare_not_found_aborts() {
        let store: Arc<dyn Store> = Arc::new(InMemoryStore::new("p1"));
        let participant = LocalParticipant::new(Region::new("us-west"), store);

        let outcome = participant
            .prepare(&TxId::new("tx-1"), &RideId::new("missing"), Role::Source)
            .await
            .unwrap();
        assert_eq!(outcome.vote, Vote::Abort);
        assert_eq!(outcome.reason, Some(Reason::NotFound));
    }

    #[tokio::test]
    async fn target_prepare_duplicate_aborts() {
        let mem = InMemoryStore::new("p1");
        mem.seed(ride("r1", "us-east"));
        let store: Arc<dyn Store> = Arc::new(mem);
        let participant = LocalParticipant::new(Region::new("us-east"), store);

        let outcome = participant
            .prepare(&TxId::new("tx-other"), &RideId::new("r1"), Role::Target)
            .await
            .unwrap();
        assert_eq!(outcome.vote, Vote::Abort);
        assert_eq!(outcome.reason, Some(Reason::Duplicate));
    }

    #[tokio::test]
    async fn full_handoff_via_local_participants() {
        let source_mem = InMemoryStore::new("src");
        source_mem.seed(ride("r1", "us-west"));
        let source_store: Arc<dyn Store> = Arc::new(source_mem);
        let target_store: Arc<dyn Store> = Arc::new(InMemoryStore::new("dst"));

        let source = LocalParticipant::new(Region::new("us-west"), Arc::clone(&source_store));
        let target = LocalParticipant::new(Region::new("us-east"), Arc::clone(&target_store));

        let tx_id = TxId::new("tx-1");
        let ride_id = RideId::new("r1");

        let src_prep = source.prepare(&tx_id, &ride_id, Role::Source).await.unwrap();
        assert_eq!(src_prep.vote, Vote::Commit);
        let snapshot = src_prep.ride.unwrap();

        let tgt_prep = target.prepare(&tx_id, &ride_id, Role::Target).await.unwrap();
        assert_eq!(tgt_prep.vote, Vote::Commit);

        target
            .commit(&tx_id, &ride_id, Role::Target, Some(snapshot))
            .await
            .unwrap();
        source.commit(&tx_id, &ride_id, Role::Source, None).await.unwrap();

        assert!(source_store.get_ride(&ride_id).await.unwrap().is_none());
        let moved = target_store.get_ride(&ride_id).await.unwrap().unwrap();
        assert_eq!(moved.region, Region::new("us-east"));
        assert!(!moved.locked);
    }
}
