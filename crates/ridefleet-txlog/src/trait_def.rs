use crate::LogError;
use async_trait::async_trait;
use ridefleet_types::{TransactionRecord, TxId, TxState};

/// Durable, append-only transaction log keyed by `tx_id`.
///
/// `Append` is idempotent: calling it twice with the same `tx_id` and state
/// has no additional effect, and state transitions are enforced to be
/// monotone (`Started -> Prepared -> Committed` or `-> Aborted`).
#[async_trait]
pub trait Log: Send + Sync {
    /// Appends or merges `record` onto the log, returning the stored
    /// (possibly merged) result.
    async fn append(&self, record: TransactionRecord) -> Result<TransactionRecord, LogError>;

    async fn get(&self, tx_id: &TxId) -> Result<Option<TransactionRecord>, LogError>;

    /// Returns every record matching `state`, or every record if `None`,
    /// ordered by `started_at`.
    async fn scan(&self, state: Option<TxState>) -> Result<Vec<TransactionRecord>, LogError>;
}
