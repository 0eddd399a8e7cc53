use async_trait::async_trait;
use ridefleet_store::StoreHealth;
use ridefleet_types::{FleetError, Reason, Ride, RideFilter, RideId, Role, TxId, Vote};

/// A participant's answer to `prepare`.
#[derive(Debug, Clone)]
pub struct PrepareOutcome {
    pub vote: Vote,
    pub reason: Option<Reason>,
    pub ride: Option<Ride>,
}

/// A participant's answer to `status`, used during coordinator recovery.
#[derive(Debug, Clone)]
pub struct StatusOutcome {
    pub present: bool,
    pub locked: bool,
}

/// The region participant protocol: four idempotent operations keyed by
/// `tx_id`, safe under duplicate delivery from coordinator retries.
///
/// Implemented either by [`crate::LocalParticipant`] (in-process, for tests
/// and single-binary demos) or [`crate::HttpParticipant`] (a remote region
/// reached over HTTP), so the coordinator can hold a
/// `HashMap<Region, Arc<dyn Participant>>` uniformly.
#[async_trait]
pub trait Participant: Send + Sync {
    async fn prepare(
        &self,
        tx_id: &TxId,
        ride_id: &RideId,
        role: Role,
    ) -> Result<PrepareOutcome, FleetError>;

    async fn commit(
        &self,
        tx_id: &TxId,
        ride_id: &RideId,
        role: Role,
        ride_snapshot: Option<Ride>,
    ) -> Result<(), FleetError>;

    async fn abort(&self, tx_id: &TxId, ride_id: &RideId, role: Role) -> Result<(), FleetError>;

    async fn status(&self, tx_id: &TxId) -> Result<StatusOutcome, FleetError>;

    async fn health(&self) -> Result<StoreHealth, FleetError>;

    /// The region's local read endpoint: applies `filter` to this region's
    /// rides only. Used by the query router's `local` and `global-live`
    /// scopes; never by 2PC.
    async fn search(&self, filter: &RideFilter) -> Result<Vec<Ride>, FleetError>;
}
