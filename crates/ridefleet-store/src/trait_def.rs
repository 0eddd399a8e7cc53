use crate::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ridefleet_types::{Ride, RideId, TxId};

/// Snapshot returned by a region store's `health()` probe target.
#[derive(Debug, Clone)]
pub struct StoreHealth {
    pub primary_id: String,
    pub replication_lag_ms: u64,
    pub last_write_at: DateTime<Utc>,
}

/// The region store client contract: a replicated document store supporting
/// atomic single-document operations and compare-and-set locking.
///
/// `Lock` is the linchpin invariant: it must succeed only when the document
/// is currently unlocked, and it must atomically set `locked`,
/// `transaction_id`, and `handoff_status` together. Every method must be
/// safe to call again with the same `tx_id` after a timeout or retry.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_ride(&self, ride_id: &RideId) -> Result<Option<Ride>, StoreError>;

    /// Inserts a new ride document. Fails with `AlreadyExists` unless the
    /// caller is replaying the same insert for the same `ride_id` and
    /// region, in which case it must succeed idempotently.
    async fn insert_ride(&self, ride: Ride) -> Result<(), StoreError>;

    /// Deletes a ride document, but only if its `transaction_id` matches
    /// `tx_id`. A missing document counts as success (idempotent delete).
    async fn delete_ride(&self, ride_id: &RideId, tx_id: &TxId) -> Result<(), StoreError>;

    /// Compare-and-set lock: succeeds only if the document is unlocked, and
    /// then atomically sets `locked = true`, `transaction_id = tx_id`,
    /// `handoff_status = PREPARING`. Returns the locked ride.
    async fn lock(&self, ride_id: &RideId, tx_id: &TxId) -> Result<Ride, StoreError>;

    /// Inverse of `lock`: clears the lock fields, but only if currently held
    /// by `tx_id`. Releasing a lock not held by `tx_id` (or not found) is a
    /// no-op success.
    async fn unlock(&self, ride_id: &RideId, tx_id: &TxId) -> Result<(), StoreError>;

    /// Clears lock fields and marks `handoff_status = COMPLETED` on the
    /// document that `tx_id` inserted.
    async fn finalize(&self, ride_id: &RideId, tx_id: &TxId) -> Result<(), StoreError>;

    /// Region-level health snapshot, independent of any single document.
    async fn health(&self) -> Result<StoreHealth, StoreError>;

    /// Finds the ride currently locked by (or most recently associated
    /// with) `tx_id`, used by the participant's `status` probe during
    /// coordinator recovery.
    async fn find_by_transaction(&self, tx_id: &TxId) -> Result<Option<Ride>, StoreError>;

    /// Removes a ride regardless of lock state. Outside the 2PC protocol;
    /// backs the plain `DELETE /rides/{id}` administrative endpoint, not
    /// `commit`/`abort`. Returns whether a document was present.
    async fn remove_ride_unconditional(&self, ride_id: &RideId) -> Result<bool, StoreError>;

    /// Returns every ride currently held, for `GET /stats` aggregation and
    /// the query router's `local`/`global-live` scopes.
    async fn list_rides(&self) -> Result<Vec<Ride>, StoreError>;
}
