use ridefleet_types::{FleetError, Reason};
use thiserror::Error;

/// Errors surfaced by a region store client.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    #[error("ride {0} not found")]
    NotFound(String),

    #[error("ride {0} already exists")]
    AlreadyExists(String),

    #[error("ride {0} already locked by another transaction")]
    AlreadyLocked(String),

    #[error("ride {0} is not locked by transaction {1}")]
    WrongTransaction(String, String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store io error: {0}")]
    Io(String),
}

impl StoreError {
    /// Transient errors are safe to retry with backoff; durable ones are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

impl From<StoreError> for FleetError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => FleetError::NotFound(format!("ride {id}")),
            StoreError::AlreadyExists(id) => {
                FleetError::Duplicate(format!("ride {id} already exists"))
            }
            StoreError::AlreadyLocked(id) => {
                FleetError::Contested(format!("ride {id} already locked"))
            }
            StoreError::WrongTransaction(id, tx) => {
                FleetError::Contested(format!("ride {id} locked by different transaction {tx}"))
            }
            StoreError::Unavailable(reason) => FleetError::Unavailable(reason),
            StoreError::Io(reason) => FleetError::Internal(reason),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Maps a [`StoreError`] onto the shared reason-code taxonomy.
pub fn reason_for(err: &StoreError) -> Reason {
    FleetError::from(err.clone()).reason()
}
