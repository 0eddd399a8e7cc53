use crate::{Region, Ride, RideId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a handoff transaction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxId(String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TxId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Which side of a handoff a participant call addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Source,
    Target,
}

/// A participant's vote in response to a `prepare` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Vote {
    Commit,
    Abort,
}

/// Monotone state of a transaction record. Transitions only ever move
/// forward: `Started -> Prepared -> Committed` or `Started|Prepared ->
/// Aborted`. Committed and Aborted are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxState {
    Started,
    Prepared,
    Committed,
    Aborted,
}

impl TxState {
    /// True once the record can no longer change state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Aborted)
    }

    /// True if `self -> next` is an allowed monotone transition.
    pub fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Started, Self::Prepared)
                | (Self::Started, Self::Aborted)
                | (Self::Prepared, Self::Committed)
                | (Self::Prepared, Self::Aborted)
        )
    }
}

/// Durable record of a single handoff transaction, as written to the
/// transaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub tx_id: TxId,
    pub ride_id: RideId,
    pub source: Region,
    pub target: Region,
    pub state: TxState,
    #[serde(default)]
    pub source_vote: Option<Vote>,
    #[serde(default)]
    pub target_vote: Option<Vote>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub prepared_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub committed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub aborted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ride_snapshot: Option<Ride>,
}

impl TransactionRecord {
    pub fn started(tx_id: TxId, ride_id: RideId, source: Region, target: Region) -> Self {
        Self {
            tx_id,
            ride_id,
            source,
            target,
            state: TxState::Started,
            source_vote: None,
            target_vote: None,
            started_at: Utc::now(),
            prepared_at: None,
            committed_at: None,
            aborted_at: None,
            error: None,
            ride_snapshot: None,
        }
    }

    /// Both participants voted to commit.
    pub fn both_voted_commit(&self) -> bool {
        matches!(self.source_vote, Some(Vote::Commit)) && matches!(self.target_vote, Some(Vote::Commit))
    }
}

/// A deferred handoff request waiting on an unhealthy target region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferEntry {
    pub ride_id: RideId,
    pub source: Region,
    pub target: Region,
    pub enqueued_at: DateTime<Utc>,
    pub attempts: u32,
}

impl BufferEntry {
    pub fn new(ride_id: RideId, source: Region, target: Region) -> Self {
        Self {
            ride_id,
            source,
            target,
            enqueued_at: Utc::now(),
            attempts: 0,
        }
    }
}
