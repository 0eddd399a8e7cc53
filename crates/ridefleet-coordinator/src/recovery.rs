use crate::coordinator::Coordinator;
use chrono::Utc;
use ridefleet_types::{Role, TransactionRecord, TxState};
use tracing::{info, warn};

/// Scans the transaction log on startup for non-terminal records and
/// resolves each per spec section 4.C. Intended to run once before a
/// coordinator starts accepting new `Handoff` calls.
pub async fn recover(coordinator: &Coordinator) {
    let started = coordinator.log().scan(Some(TxState::Started)).await.unwrap_or_default();
    for record in started {
        recover_started(coordinator, record).await;
    }

    let prepared = coordinator.log().scan(Some(TxState::Prepared)).await.unwrap_or_default();
    for record in prepared {
        recover_prepared(coordinator, record).await;
    }
}

async fn recover_started(coordinator: &Coordinator, mut record: TransactionRecord) {
    let (Some(source), Some(target)) = (
        coordinator.participant(&record.source),
        coordinator.participant(&record.target),
    ) else {
        warn!(tx_id = record.tx_id.as_str(), "recovery: region no longer configured, leaving STARTED");
        return;
    };

    let source_status = source.status(&record.tx_id).await;
    let target_status = target.status(&record.tx_id).await;

    match (source_status, target_status) {
        (Ok(src), Ok(tgt)) => {
            // Source locked, target absent: forward progress never reached
            // PREPARED on the target side. Any other observed combination is
            // resolved the same way forward execution would: since STARTED
            // never promised the target anything, the safe move is always
            // abort both sides.
            let _ = source.abort(&record.tx_id, &record.ride_id, Role::Source).await;
            let _ = target.abort(&record.tx_id, &record.ride_id, Role::Target).await;
            record.state = TxState::Aborted;
            record.aborted_at = Some(Utc::now());
            record.error = Some(format!(
                "recovered from STARTED: source.locked={}, target.present={}",
                src.locked, tgt.present
            ));
            if let Err(e) = coordinator.log().append(record.clone()).await {
                warn!(tx_id = record.tx_id.as_str(), "recovery: failed to persist ABORTED: {e}");
            } else {
                info!(tx_id = record.tx_id.as_str(), "recovery: STARTED -> ABORTED");
            }
        }
        _ => {
            warn!(
                tx_id = record.tx_id.as_str(),
                "recovery: participant probe unavailable, leaving STARTED for a later pass"
            );
        }
    }
}

async fn recover_prepared(coordinator: &Coordinator, mut record: TransactionRecord) {
    let (Some(source), Some(target)) = (
        coordinator.participant(&record.source),
        coordinator.participant(&record.target),
    ) else {
        warn!(tx_id = record.tx_id.as_str(), "recovery: region no longer configured, leaving PREPARED");
        return;
    };

    if record.both_voted_commit() {
        let commit_target = target
            .commit(&record.tx_id, &record.ride_id, Role::Target, record.ride_snapshot.clone())
            .await;
        if let Err(e) = commit_target {
            warn!(tx_id = record.tx_id.as_str(), "recovery: resume target commit failed, retry later: {e}");
            return;
        }
        let commit_source = source.commit(&record.tx_id, &record.ride_id, Role::Source, None).await;
        if let Err(e) = commit_source {
            warn!(tx_id = record.tx_id.as_str(), "recovery: resume source commit failed, retry later: {e}");
            return;
        }

        record.state = TxState::Committed;
        record.committed_at = Some(Utc::now());
        if let Err(e) = coordinator.log().append(record.clone()).await {
            warn!(tx_id = record.tx_id.as_str(), "recovery: failed to persist COMMITTED: {e}");
        } else {
            info!(tx_id = record.tx_id.as_str(), "recovery: PREPARED -> COMMITTED");
        }
    } else {
        let _ = source.abort(&record.tx_id, &record.ride_id, Role::Source).await;
        let _ = target.abort(&record.tx_id, &record.ride_id, Role::Target).await;
        record.state = TxState::Aborted;
        record.aborted_at = Some(Utc::now());
        record.error = Some("recovered from PREPARED with a non-commit vote".to_string());
        if let Err(e) = coordinator.log().append(record.clone()).await {
            warn!(tx_id = record.tx_id.as_str(), "recovery: failed to persist ABORTED: {e}");
        } else {
            info!(tx_id = record.tx_id.as_str(), "recovery: PREPARED -> ABORTED");
        }
    }
}
