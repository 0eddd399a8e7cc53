use crate::error::LogError;
use ridefleet_types::TransactionRecord;

/// Merges an incoming `Append` onto the current record for a `tx_id`.
///
/// `tx_id` and `started_at` are last-write-wins *to the original* (i.e.
/// never overwritten once set); every other field is last-write-wins from
/// `incoming`. State transitions must be monotone; re-appending the current
/// state is an idempotent no-op; appending onto a terminal record is
/// ignored and returns the terminal record unchanged.
pub fn merge(
    existing: Option<&TransactionRecord>,
    incoming: TransactionRecord,
) -> Result<TransactionRecord, LogError> {
    let Some(current) = existing else {
        return Ok(incoming);
    };

    if current.state.is_terminal() {
        return Ok(current.clone());
    }

    if current.state != incoming.state && !current.state.can_advance_to(incoming.state) {
        return Err(LogError::InvalidTransition {
            from: current.state,
            to: incoming.state,
        });
    }

    let mut merged = incoming;
    merged.tx_id = current.tx_id.clone();
    merged.started_at = current.started_at;
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridefleet_types::{Region, RideId, TxId, TxState, Vote};

    fn record(state: TxState) -> TransactionRecord {
        let mut r = TransactionRecord::started(
            TxId::new("tx-1"),
            RideId::new("r1"),
            Region::new("us-west"),
            Region::new("us-east"),
        );
        r.state = state;
        r
    }

    #[test]
    fn first_append_is_accepted_verbatim() {
        let merged = merge(None, record(TxState::Started)).unwrap();
        assert_eq!(merged.state, TxState::Started);
    }

    #[test]
    fn forward_transition_is_accepted() {
        let cur = record(TxState::Started);
        let mut next = record(TxState::Prepared);
        next.source_vote = Some(Vote::Commit);
        let merged = merge(Some(&cur), next).unwrap();
        assert_eq!(merged.state, TxState::Prepared);
        assert_eq!(merged.source_vote, Some(Vote::Commit));
    }

    #[test]
    fn backward_transition_is_rejected() {
        let cur = record(TxState::Prepared);
        let err = merge(Some(&cur), record(TxState::Started)).unwrap_err();
        assert!(matches!(err, LogError::InvalidTransition { .. }));
    }

    #[test]
    fn terminal_record_ignores_further_appends() {
        let cur = record(TxState::Committed);
        let merged = merge(Some(&cur), record(TxState::Aborted)).unwrap();
        assert_eq!(merged.state, TxState::Committed);
    }

    #[test]
    fn replaying_same_state_is_idempotent() {
        let cur = record(TxState::Prepared);
        let merged = merge(Some(&cur), record(TxState::Prepared)).unwrap();
        assert_eq!(merged.state, TxState::Prepared);
    }
}
