use crate::{merge::merge, Log, LogError};
use async_trait::async_trait;
use ridefleet_types::{TransactionRecord, TxId, TxState};
use std::collections::HashMap;
use std::sync::Mutex;

/// Purely in-memory transaction log. Used for tests and for the
/// ephemeral-buffer configuration path where durability across restart is
/// explicitly not required.
#[derive(Default)]
pub struct MemoryLog {
    records: Mutex<HashMap<TxId, TransactionRecord>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Log for MemoryLog {
    async fn append(&self, record: TransactionRecord) -> Result<TransactionRecord, LogError> {
        let mut records = self.records.lock().unwrap();
        let merged = merge(records.get(&record.tx_id), record)?;
        records.insert(merged.tx_id.clone(), merged.clone());
        Ok(merged)
    }

    async fn get(&self, tx_id: &TxId) -> Result<Option<TransactionRecord>, LogError> {
        Ok(self.records.lock().unwrap().get(tx_id).cloned())
    }

    async fn scan(&self, state: Option<TxState>) -> Result<Vec<TransactionRecord>, LogError> {
        let records = self.records.lock().unwrap();
        let mut out: Vec<_> = records
            .values()
            .filter(|r| state.is_none_or(|s| r.state == s))
            .cloned()
            .collect();
        out.sort_by_key(|r| r.started_at);
        Ok(out)
    }
}
