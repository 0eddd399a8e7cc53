use crate::backoff::retry_with_backoff;
use crate::buffer::Buffer;
use crate::config::CoordinatorConfig;
use crate::outcome::HandoffResult;
use chrono::Utc;
use ridefleet_health::HealthMonitor;
use ridefleet_participant::Participant;
use ridefleet_txlog::Log;
use ridefleet_types::{BufferEntry, Reason, Region, RideId, Role, TransactionRecord, TxId, TxState, Vote};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// The 2PC handoff coordinator: validates a request, gates it on region
/// health, drives `prepare`/`commit` against the source and target
/// participants, and durably logs every state transition so a crash can be
/// recovered from.
pub struct Coordinator {
    pub(crate) participants: HashMap<Region, Arc<dyn Participant>>,
    pub(crate) health: Arc<HealthMonitor>,
    pub(crate) log: Arc<dyn Log>,
    pub(crate) buffer: Buffer,
    pub(crate) config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(
        participants: HashMap<Region, Arc<dyn Participant>>,
        health: Arc<HealthMonitor>,
        log: Arc<dyn Log>,
        config: CoordinatorConfig,
    ) -> Arc<Self> {
        let buffer = Buffer::new(config.buffer_max_per_region);
        Arc::new(Self {
            participants,
            health,
            log,
            buffer,
            config,
        })
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn log(&self) -> &Arc<dyn Log> {
        &self.log
    }

    pub fn health(&self) -> &Arc<HealthMonitor> {
        &self.health
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.participants.keys()
    }

    pub async fn transactions(&self, limit: usize) -> Vec<TransactionRecord> {
        let mut records = self.log.scan(None).await.unwrap_or_default();
        records.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        records.truncate(limit);
        records
    }

    /// Runs the full handoff algorithm (spec section 4.E).
    pub async fn handoff(&self, ride_id: RideId, source: Region, target: Region) -> HandoffResult {
        let started = Instant::now();

        if source == target || ride_id.is_empty() {
            return HandoffResult::aborted(None, Reason::InvalidArgument, "same region or empty ride id", elapsed_ms(started));
        }
        let Some(source_participant) = self.participants.get(&source).cloned() else {
            return HandoffResult::aborted(None, Reason::InvalidArgument, "unknown source region", elapsed_ms(started));
        };
        let Some(target_participant) = self.participants.get(&target).cloned() else {
            return HandoffResult::aborted(None, Reason::InvalidArgument, "unknown target region", elapsed_ms(started));
        };

        if self.health.is_unavailable(&target) {
            let entry = BufferEntry::new(ride_id, source, target.clone());
            if self.buffer.try_enqueue(entry).await {
                return HandoffResult::buffered(elapsed_ms(started));
            }
            return HandoffResult::aborted(None, Reason::BufferFull, "target buffer full", elapsed_ms(started));
        }
        if self.health.is_unavailable(&source) {
            return HandoffResult::aborted(None, Reason::Unavailable, "source_unavailable", elapsed_ms(started));
        }

        let tx_id = TxId::generate();
        let mut record = TransactionRecord::started(tx_id.clone(), ride_id.clone(), source.clone(), target.clone());
        if let Err(e) = self.log.append(record.clone()).await {
            error!(tx_id = tx_id.as_str(), "failed to append STARTED record: {e}");
            return HandoffResult::aborted(Some(tx_id), Reason::Internal, e.to_string(), elapsed_ms(started));
        }
        info!(tx_id = tx_id.as_str(), ride_id = ride_id.as_str(), %source, %target, "handoff STARTED");

        let reached_prepared = Arc::new(AtomicBool::new(false));
        let transaction = self.run_transaction(
            &mut record,
            &source_participant,
            &target_participant,
            &tx_id,
            &ride_id,
            started,
            Arc::clone(&reached_prepared),
        );

        match tokio::time::timeout(self.config.overall_timeout, transaction).await {
            Ok(result) => result,
            Err(_) if reached_prepared.load(Ordering::Acquire) => {
                warn!(tx_id = tx_id.as_str(), "overall deadline expired mid-commit");
                HandoffResult::partial(tx_id, elapsed_ms(started))
            }
            Err(_) => {
                warn!(tx_id = tx_id.as_str(), "overall deadline expired mid-prepare, aborting");
                let _ = source_participant.abort(&tx_id, &ride_id, Role::Source).await;
                let _ = target_participant.abort(&tx_id, &ride_id, Role::Target).await;
                record.state = TxState::Aborted;
                record.aborted_at = Some(Utc::now());
                record.error = Some("overall deadline expired mid-prepare".to_string());
                if let Err(e) = self.log.append(record).await {
                    error!(tx_id = tx_id.as_str(), "failed to append ABORTED record: {e}");
                }
                HandoffResult::aborted(
                    Some(tx_id),
                    Reason::Unavailable,
                    "overall deadline expired mid-prepare",
                    elapsed_ms(started),
                )
            }
        }
    }

    /// Drives prepare/commit for an already-`STARTED` record, up to the
    /// point of `COMMITTED`. Split out of [`Coordinator::handoff`] so the
    /// overall deadline (spec section 5) can wrap it in one
    /// `tokio::time::timeout` without losing track of whether the deadline
    /// hit mid-PREPARE (abort) or mid-COMMIT (partial): `reached_prepared`
    /// flips to `true` right after the PREPARED record lands, and is read
    /// back by the caller if this future gets cancelled by the timeout.
    #[allow(clippy::too_many_arguments)]
    async fn run_transaction(
        &self,
        record: &mut TransactionRecord,
        source_participant: &Arc<dyn Participant>,
        target_participant: &Arc<dyn Participant>,
        tx_id: &TxId,
        ride_id: &RideId,
        started: Instant,
        reached_prepared: Arc<AtomicBool>,
    ) -> HandoffResult {
        let prepare_src = match self.call_prepare(source_participant, tx_id, ride_id, Role::Source).await {
            Ok(outcome) if outcome.vote == Vote::Commit => outcome,
            Ok(outcome) => {
                return self
                    .abort_path(record, &[], outcome.reason.unwrap_or(Reason::Internal), "source refused prepare", started)
                    .await;
            }
            Err(_) => {
                return self
                    .abort_path(record, &[], Reason::Unavailable, "source prepare timed out or unreachable", started)
                    .await;
            }
        };

        match self.call_prepare(target_participant, tx_id, ride_id, Role::Target).await {
            Ok(outcome) if outcome.vote == Vote::Commit => outcome,
            Ok(outcome) => {
                return self
                    .abort_path(
                        record,
                        &[(source_participant, Role::Source)],
                        outcome.reason.unwrap_or(Reason::Internal),
                        "target refused prepare",
                        started,
                    )
                    .await;
            }
            Err(_) => {
                return self
                    .abort_path(
                        record,
                        &[(source_participant, Role::Source)],
                        Reason::Unavailable,
                        "target prepare timed out or unreachable",
                        started,
                    )
                    .await;
            }
        };

        record.state = TxState::Prepared;
        record.source_vote = Some(Vote::Commit);
        record.target_vote = Some(Vote::Commit);
        record.prepared_at = Some(Utc::now());
        record.ride_snapshot = prepare_src.ride.clone();
        if let Err(e) = self.log.append(record.clone()).await {
            error!(tx_id = tx_id.as_str(), "failed to append PREPARED record: {e}");
            return HandoffResult::partial(tx_id.clone(), elapsed_ms(started));
        }
        reached_prepared.store(true, Ordering::Release);
        info!(tx_id = tx_id.as_str(), "handoff PREPARED");

        let commit_target = retry_with_backoff(&self.config.retry, || {
            self.call_commit(target_participant, tx_id, ride_id, Role::Target, prepare_src.ride.clone())
        })
        .await;
        if let Err(e) = commit_target {
            warn!(tx_id = tx_id.as_str(), "target commit failed after retries: {e}");
            return HandoffResult::partial(tx_id.clone(), elapsed_ms(started));
        }

        let commit_source = retry_with_backoff(&self.config.retry, || {
            self.call_commit(source_participant, tx_id, ride_id, Role::Source, None)
        })
        .await;
        if let Err(e) = commit_source {
            warn!(tx_id = tx_id.as_str(), "source commit failed after retries (target already committed): {e}");
            return HandoffResult::partial(tx_id.clone(), elapsed_ms(started));
        }

        record.state = TxState::Committed;
        record.committed_at = Some(Utc::now());
        if let Err(e) = self.log.append(record.clone()).await {
            warn!(tx_id = tx_id.as_str(), "failed to append COMMITTED record: {e}");
        }
        info!(tx_id = tx_id.as_str(), "handoff COMMITTED");
        HandoffResult::success(tx_id.clone(), elapsed_ms(started))
    }

    async fn call_prepare(
        &self,
        participant: &Arc<dyn Participant>,
        tx_id: &TxId,
        ride_id: &RideId,
        role: Role,
    ) -> Result<ridefleet_participant::PrepareOutcome, ridefleet_types::FleetError> {
        match tokio::time::timeout(self.config.prepare_timeout, participant.prepare(tx_id, ride_id, role)).await {
            Ok(result) => result,
            Err(_) => Err(ridefleet_types::FleetError::Unavailable(format!(
                "prepare({role:?}) timed out after {:?}",
                self.config.prepare_timeout
            ))),
        }
    }

    async fn call_commit(
        &self,
        participant: &Arc<dyn Participant>,
        tx_id: &TxId,
        ride_id: &RideId,
        role: Role,
        ride_snapshot: Option<ridefleet_types::Ride>,
    ) -> Result<(), ridefleet_types::FleetError> {
        match tokio::time::timeout(self.config.commit_timeout, participant.commit(tx_id, ride_id, role, ride_snapshot)).await {
            Ok(result) => result,
            Err(_) => Err(ridefleet_types::FleetError::Unavailable(format!(
                "commit({role:?}) timed out after {:?}",
                self.config.commit_timeout
            ))),
        }
    }

    /// Issues `abort` to every already-engaged participant (idempotent, so
    /// failures here are logged and otherwise ignored) and writes the
    /// terminal `ABORTED` record.
    async fn abort_path(
        &self,
        record: &mut TransactionRecord,
        engaged: &[(&Arc<dyn Participant>, Role)],
        reason: Reason,
        detail: &str,
        started: Instant,
    ) -> HandoffResult {
        for (participant, role) in engaged {
            if let Err(e) = participant.abort(&record.tx_id, &record.ride_id, *role).await {
                warn!(tx_id = record.tx_id.as_str(), ?role, "abort call failed: {e}");
            }
        }

        record.state = TxState::Aborted;
        record.aborted_at = Some(Utc::now());
        record.error = Some(detail.to_string());
        if let Err(e) = self.log.append(record.clone()).await {
            error!(tx_id = record.tx_id.as_str(), "failed to append ABORTED record: {e}");
        }
        warn!(tx_id = record.tx_id.as_str(), reason = reason.as_str(), "handoff ABORTED: {detail}");

        HandoffResult::aborted(Some(record.tx_id.clone()), reason, detail.to_string(), elapsed_ms(started))
    }

    pub(crate) fn participant(&self, region: &Region) -> Option<Arc<dyn Participant>> {
        self.participants.get(region).cloned()
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
