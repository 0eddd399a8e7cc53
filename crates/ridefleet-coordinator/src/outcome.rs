use ridefleet_types::{Reason, TxId};
use serde::{Deserialize, Serialize};

/// Top-level status returned from one `Handoff` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    Success,
    Aborted,
    Buffered,
    Partial,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Aborted => "ABORTED",
            Self::Buffered => "BUFFERED",
            Self::Partial => "PARTIAL",
        }
    }
}

/// Result of a `Handoff` call, whether returned directly to the caller or
/// produced while draining a buffered entry.
#[derive(Debug, Clone)]
pub struct HandoffResult {
    pub status: OutcomeStatus,
    pub tx_id: Option<TxId>,
    pub latency_ms: u64,
    pub reason: Option<Reason>,
    /// Free-text detail beyond the machine-readable `reason`, e.g.
    /// `"source_unavailable"`.
    pub detail: Option<String>,
}

impl HandoffResult {
    pub fn success(tx_id: TxId, latency_ms: u64) -> Self {
        Self {
            status: OutcomeStatus::Success,
            tx_id: Some(tx_id),
            latency_ms,
            reason: None,
            detail: None,
        }
    }

    pub fn aborted(tx_id: Option<TxId>, reason: Reason, detail: impl Into<String>, latency_ms: u64) -> Self {
        Self {
            status: OutcomeStatus::Aborted,
            tx_id,
            latency_ms,
            reason: Some(reason),
            detail: Some(detail.into()),
        }
    }

    pub fn buffered(latency_ms: u64) -> Self {
        Self {
            status: OutcomeStatus::Buffered,
            tx_id: None,
            latency_ms,
            reason: None,
            detail: None,
        }
    }

    pub fn partial(tx_id: TxId, latency_ms: u64) -> Self {
        Self {
            status: OutcomeStatus::Partial,
            tx_id: Some(tx_id),
            latency_ms,
            reason: Some(Reason::Partial),
            detail: None,
        }
    }
}
