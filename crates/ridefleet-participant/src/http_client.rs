use crate::trait_def::{Participant, PrepareOutcome, StatusOutcome};
use crate::wire::{
    AbortRequest, AbortResponse, CommitRequest, CommitResponse, HealthResponse, PrepareRequest,
    PrepareResponse, SearchResponse, StatusResponse,
};
use async_trait::async_trait;
use ridefleet_net::Method;
use ridefleet_store::StoreHealth;
use ridefleet_types::{FleetError, Reason, Ride, RideFilter, RideId, Role, TxId, Vote};
use std::net::SocketAddr;
use std::time::Duration;

/// A region participant reached over HTTP. Network and protocol errors are
/// surfaced as [`FleetError::Unavailable`] so the coordinator's retry logic
/// treats them as transient.
pub struct HttpParticipant {
    addr: SocketAddr,
    timeout: Duration,
}

impl HttpParticipant {
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        Self { addr, timeout }
    }

    async fn post_json<Req: serde::Serialize, Resp: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        req: &Req,
    ) -> Result<Resp, FleetError> {
        let body = serde_json::to_vec(req)
            .map_err(|e| FleetError::Internal(format!("encode request: {e}")))?;
        let response = ridefleet_net::send(self.addr, Method::Post, path, Some(&body), self.timeout)
            .await
            .map_err(|e| FleetError::Unavailable(format!("{} unreachable: {e}", self.addr)))?;

        if response.status >= 500 || response.status == 503 {
            return Err(FleetError::Unavailable(format!(
                "{} returned {}",
                self.addr, response.status
            )));
        }
        serde_json::from_slice(&response.body)
            .map_err(|e| FleetError::Internal(format!("decode response: {e}")))
    }
}

#[async_trait]
impl Participant for HttpParticipant {
    async fn prepare(
        &self,
        tx_id: &TxId,
        ride_id: &RideId,
        role: Role,
    ) -> Result<PrepareOutcome, FleetError> {
        let req = PrepareRequest {
            tx_id: tx_id.clone(),
            ride_id: ride_id.to_string(),
            role,
        };
        let resp: PrepareResponse = self.post_json("/2pc/prepare", &req).await?;
        let vote = match resp.vote.as_str() {
            "COMMIT" => Vote::Commit,
            _ => Vote::Abort,
        };
        let reason = resp.reason.as_deref().and_then(parse_reason);
        Ok(PrepareOutcome {
            vote,
            reason,
            ride: resp.ride,
        })
    }

    async fn commit(
        &self,
        tx_id: &TxId,
        ride_id: &RideId,
        role: Role,
        ride_snapshot: Option<Ride>,
    ) -> Result<(), FleetError> {
        let req = CommitRequest {
            tx_id: tx_id.clone(),
            ride_id: ride_id.to_string(),
            role,
            ride: ride_snapshot,
        };
        let resp: CommitResponse = self.post_json("/2pc/commit", &req).await?;
        if resp.committed {
            Ok(())
        } else {
            Err(FleetError::Internal(format!(
                "{} refused commit for {ride_id}",
                self.addr
            )))
        }
    }

    async fn abort(&self, tx_id: &TxId, ride_id: &RideId, role: Role) -> Result<(), FleetError> {
        let req = AbortRequest {
            tx_id: tx_id.clone(),
            ride_id: ride_id.to_string(),
            role,
        };
        let _resp: AbortResponse = self.post_json("/2pc/abort", &req).await?;
        Ok(())
    }

    async fn status(&self, tx_id: &TxId) -> Result<StatusOutcome, FleetError> {
        let path = format!("/2pc/status/{tx_id}");
        let response = ridefleet_net::send(self.addr, Method::Get, &path, None, self.timeout)
            .await
            .map_err(|e| FleetError::Unavailable(format!("{} unreachable: {e}", self.addr)))?;
        if response.status >= 500 {
            return Err(FleetError::Unavailable(format!(
                "{} returned {}",
                self.addr, response.status
            )));
        }
        let resp: StatusResponse = serde_json::from_slice(&response.body)
            .map_err(|e| FleetError::Internal(format!("decode response: {e}")))?;
        Ok(StatusOutcome {
            present: resp.present,
            locked: resp.locked,
        })
    }

    async fn health(&self) -> Result<StoreHealth, FleetError> {
        let response = ridefleet_net::send(self.addr, Method::Get, "/health", None, self.timeout)
            .await
            .map_err(|e| FleetError::Unavailable(format!("{} unreachable: {e}", self.addr)))?;
        if response.status != 200 {
            return Err(FleetError::Unavailable(format!(
                "{} health returned {}",
                self.addr, response.status
            )));
        }
        let resp: HealthResponse = serde_json::from_slice(&response.body)
            .map_err(|e| FleetError::Internal(format!("decode response: {e}")))?;
        Ok(StoreHealth {
            primary_id: resp.primary,
            replication_lag_ms: resp.replication_lag_ms,
            last_write_at: resp.last_write_at,
        })
    }

    async fn search(&self, filter: &RideFilter) -> Result<Vec<Ride>, FleetError> {
        let resp: SearchResponse = self.post_json("/rides/search", filter).await?;
        Ok(resp.results)
    }
}

fn parse_reason(s: &str) -> Option<Reason> {
    match s {
        "invalid_argument" => Some(Reason::InvalidArgument),
        "not_found" => Some(Reason::NotFound),
        "contested" => Some(Reason::Contested),
        "duplicate" => Some(Reason::Duplicate),
        "unavailable" => Some(Reason::Unavailable),
        "buffer_full" => Some(Reason::BufferFull),
        "partial" => Some(Reason::Partial),
        "internal" => Some(Reason::Internal),
        _ => None,
    }
}

