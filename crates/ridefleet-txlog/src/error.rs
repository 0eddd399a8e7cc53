use ridefleet_types::FleetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("transaction log io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transaction record corrupted: checksum mismatch at offset {offset}")]
    Corrupted { offset: u64 },

    #[error("transaction record serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid transaction state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: ridefleet_types::TxState,
        to: ridefleet_types::TxState,
    },
}

impl From<LogError> for FleetError {
    fn from(err: LogError) -> Self {
        FleetError::Internal(err.to_string())
    }
}
