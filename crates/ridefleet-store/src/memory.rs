use crate::{Store, StoreError, StoreHealth};
use async_trait::async_trait;
use chrono::Utc;
use ridefleet_types::{HandoffStatus, Ride, RideId, TxId};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// In-process, thread-safe document table keyed by `ride_id`. Reference
/// implementation of [`Store`], also used as the default test backend.
pub struct InMemoryStore {
    primary_id: String,
    rides: Mutex<HashMap<RideId, Ride>>,
    last_write_at: Mutex<chrono::DateTime<Utc>>,
}

impl InMemoryStore {
    pub fn new(primary_id: impl Into<String>) -> Self {
        Self {
            primary_id: primary_id.into(),
            rides: Mutex::new(HashMap::new()),
            last_write_at: Mutex::new(Utc::now()),
        }
    }

    /// Seeds the store with a ride, bypassing the insert idempotency check.
    /// Intended for test setup and CLI seeding only.
    pub fn seed(&self, ride: Ride) {
        self.rides.lock().unwrap().insert(ride.ride_id.clone(), ride);
    }

    fn touch(&self) {
        *self.last_write_at.lock().unwrap() = Utc::now();
    }

    /// Snapshot of every ride currently held, for persistence or debugging.
    pub fn snapshot(&self) -> HashMap<RideId, Ride> {
        self.rides.lock().unwrap().clone()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_ride(&self, ride_id: &RideId) -> Result<Option<Ride>, StoreError> {
        Ok(self.rides.lock().unwrap().get(ride_id).cloned())
    }

    async fn insert_ride(&self, ride: Ride) -> Result<(), StoreError> {
        let mut rides = self.rides.lock().unwrap();
        match rides.get(&ride.ride_id) {
            Some(existing) if existing.transaction_id == ride.transaction_id && existing.region == ride.region => {
                debug!(ride_id = %ride.ride_id, "insert_ride replay, already present");
                Ok(())
            }
            Some(_) => Err(StoreError::AlreadyExists(ride.ride_id.to_string())),
            None => {
                debug!(ride_id = %ride.ride_id, "insert_ride");
                rides.insert(ride.ride_id.clone(), ride);
                drop(rides);
                self.touch();
                Ok(())
            }
        }
    }

    async fn delete_ride(&self, ride_id: &RideId, tx_id: &TxId) -> Result<(), StoreError> {
        let mut rides = self.rides.lock().unwrap();
        match rides.get(ride_id) {
            None => Ok(()),
            Some(ride) if ride.transaction_id.as_ref() == Some(tx_id) => {
                debug!(ride_id = %ride_id, tx_id = %tx_id, "delete_ride");
                rides.remove(ride_id);
                drop(rides);
                self.touch();
                Ok(())
            }
            Some(_) => Err(StoreError::WrongTransaction(
                ride_id.to_string(),
                tx_id.to_string(),
            )),
        }
    }

    async fn lock(&self, ride_id: &RideId, tx_id: &TxId) -> Result<Ride, StoreError> {
        let mut rides = self.rides.lock().unwrap();
        let ride = rides
            .get_mut(ride_id)
            .ok_or_else(|| StoreError::NotFound(ride_id.to_string()))?;

        if ride.is_locked_by(tx_id) {
            debug!(ride_id = %ride_id, tx_id = %tx_id, "lock replay, already held");
            return Ok(ride.clone());
        }
        if ride.is_locked() {
            return Err(StoreError::AlreadyLocked(ride_id.to_string()));
        }

        ride.locked = true;
        ride.transaction_id = Some(tx_id.clone());
        ride.handoff_status = HandoffStatus::Preparing;
        let snapshot = ride.clone();
        drop(rides);
        self.touch();
        debug!(ride_id = %ride_id, tx_id = %tx_id, "lock acquired");
        Ok(snapshot)
    }

    async fn unlock(&self, ride_id: &RideId, tx_id: &TxId) -> Result<(), StoreError> {
        let mut rides = self.rides.lock().unwrap();
        if let Some(ride) = rides.get_mut(ride_id) {
            if ride.transaction_id.as_ref() == Some(tx_id) {
                ride.locked = false;
                ride.transaction_id = None;
                ride.handoff_status = HandoffStatus::None;
                debug!(ride_id = %ride_id, tx_id = %tx_id, "unlock");
            }
        }
        drop(rides);
        self.touch();
        Ok(())
    }

    async fn finalize(&self, ride_id: &RideId, tx_id: &TxId) -> Result<(), StoreError> {
        let mut rides = self.rides.lock().unwrap();
        if let Some(ride) = rides.get_mut(ride_id) {
            if ride.transaction_id.as_ref() == Some(tx_id) {
                ride.locked = false;
                ride.transaction_id = None;
                ride.handoff_status = HandoffStatus::Completed;
            }
        }
        drop(rides);
        self.touch();
        Ok(())
    }

    async fn health(&self) -> Result<StoreHealth, StoreError> {
        Ok(StoreHealth {
            primary_id: self.primary_id.clone(),
            replication_lag_ms: 0,
            last_write_at: *self.last_write_at.lock().unwrap(),
        })
    }

    async fn find_by_transaction(&self, tx_id: &TxId) -> Result<Option<Ride>, StoreError> {
        Ok(self
            .rides
            .lock()
            .unwrap()
            .values()
            .find(|r| r.transaction_id.as_ref() == Some(tx_id))
            .cloned())
    }

    async fn remove_ride_unconditional(&self, ride_id: &RideId) -> Result<bool, StoreError> {
        let removed = self.rides.lock().unwrap().remove(ride_id).is_some();
        self.touch();
        Ok(removed)
    }

    async fn list_rides(&self) -> Result<Vec<Ride>, StoreError> {
        Ok(self.rides.lock().unwrap().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridefleet_types::{Region, RideStatus};
    use rust_decimal::Decimal;

    fn sample_ride(id: &str, region: &str) -> Ride {
        Ride {
            ride_id: RideId::new(id),
            vehicle_id: "v1".into(),
            customer_id: "c1".into(),
            status: RideStatus::InProgress,
            fare: Decimal::new(1250, 2),
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
    async fn lock_is_cas() {
        let store = InMemoryStore::new("primary-1");
        store.seed(sample_ride("r1", "us-west"));

        let tx1 = TxId::new("tx-1");
        let tx2 = TxId::new("tx-2");

        store.lock(&RideId::new("r1"), &tx1).await.unwrap();
        let err = store.lock(&RideId::new("r1"), &tx2).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyLocked(_)));

        // replay with the same tx succeeds
        store.lock(&RideId::new("r1"), &tx1).await.unwrap();
    }

    #[tokio::test]
    async fn delete_requires_matching_transaction() {
        let store = InMemoryStore::new("primary-1");
        store.seed(sample_ride("r1", "us-west"));
        let tx1 = TxId::new("tx-1");
        store.lock(&RideId::new("r1"), &tx1).await.unwrap();

        let wrong = TxId::new("tx-2");
        assert!(store.delete_ride(&RideId::new("r1"), &wrong).await.is_err());

        store.delete_ride(&RideId::new("r1"), &tx1).await.unwrap();
        assert!(store.get_ride(&RideId::new("r1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_ride_is_idempotent_success() {
        let store = InMemoryStore::new("primary-1");
        let tx1 = TxId::new("tx-1");
        store
            .delete_ride(&RideId::new("missing"), &tx1)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unlock_wrong_transaction_is_noop_success() {
        let store = InMemoryStore::new("primary-1");
        store.seed(sample_ride("r1", "us-west"));
        let tx1 = TxId::new("tx-1");
        store.lock(&RideId::new("r1"), &tx1).await.unwrap();

        let other = TxId::new("tx-2");
        store.unlock(&RideId::new("r1"), &other).await.unwrap();

        // still locked by tx1 since the unlock targeted the wrong tx
        let ride = store.get_ride(&RideId::new("r1")).await.unwrap().unwrap();
        assert!(ride.is_locked_by(&tx1));
    }
}
