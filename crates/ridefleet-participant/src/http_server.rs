use crate::local::LocalParticipant;
use crate::trait_def::Participant;
use crate::wire::{
    AbortRequest, AbortResponse, CommitRequest, CommitResponse, ErrorBody, HealthResponse,
    PrepareRequest, PrepareResponse, SearchRequest, SearchResponse, StatsResponse, StatusResponse,
};
use async_trait::async_trait;
use ridefleet_metrics::Metrics;
use ridefleet_net::{HttpRequest, HttpResponse, Method, RequestHandler};
use ridefleet_store::Store;
use ridefleet_types::{FleetError, Region, Ride, RideId, TxId};
use std::sync::Arc;
use tracing::warn;

/// Dispatches the participant HTTP surface (spec section 6) onto a
/// [`LocalParticipant`] plus its backing [`Store`].
pub struct ParticipantServer {
    region: Region,
    store: Arc<dyn Store>,
    participant: LocalParticipant,
    metrics: Metrics,
}

impl ParticipantServer {
    pub fn new(region: Region, store: Arc<dyn Store>) -> Self {
        let participant = LocalParticipant::new(region.clone(), Arc::clone(&store));
        Self {
            region,
            store,
            participant,
            metrics: Metrics::new(),
        }
    }
}

#[async_trait]
impl RequestHandler for ParticipantServer {
    async fn handle(&self, request: HttpRequest) -> HttpResponse {
        let path = request.path.clone();
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        match (request.method, segments.as_slice()) {
            (Method::Post, ["rides"]) => self.create_ride(&request).await,
            (Method::Get, ["rides", id]) => self.get_ride(id).await,
            (Method::Delete, ["rides", id]) => self.delete_ride(id).await,
            (Method::Post, ["rides", "search"]) => self.search(&request).await,
            (Method::Get, ["stats"]) => self.stats().await,
            (Method::Get, ["health"]) => self.health().await,
            (Method::Get, ["metrics"]) => self.metrics_endpoint().await,
            (Method::Post, ["2pc", "prepare"]) => self.prepare(&request).await,
            (Method::Post, ["2pc", "commit"]) => self.commit(&request).await,
            (Method::Post, ["2pc", "abort"]) => self.abort(&request).await,
            (Method::Get, ["2pc", "status", tx_id]) => self.status(tx_id).await,
            _ => HttpResponse::not_found(),
        }
    }
}

impl ParticipantServer {
    async fn create_ride(&self, request: &HttpRequest) -> HttpResponse {
        let ride: Ride = match request.json() {
            Ok(r) => r,
            Err(e) => return HttpResponse::bad_request(format!("invalid ride body: {e}")),
        };
        match self.store.insert_ride(ride).await {
            Ok(()) => HttpResponse::text(201, "created"),
            Err(e) => error_response(e.into()),
        }
    }

    async fn get_ride(&self, id: &str) -> HttpResponse {
        match self.store.get_ride(&RideId::new(id)).await {
            Ok(Some(ride)) => HttpResponse::json(200, &ride),
            Ok(None) => HttpResponse::not_found(),
            Err(e) => error_response(e.into()),
        }
    }

    async fn delete_ride(&self, id: &str) -> HttpResponse {
        match self.store.remove_ride_unconditional(&RideId::new(id)).await {
            Ok(true) => HttpResponse::text(200, "deleted"),
            Ok(false) => HttpResponse::not_found(),
            Err(e) => error_response(e.into()),
        }
    }

    async fn search(&self, request: &HttpRequest) -> HttpResponse {
        let filter: SearchRequest = match request.json() {
            Ok(f) => f,
            Err(e) => return HttpResponse::bad_request(format!("invalid search body: {e}")),
        };
        match self.participant.search(&filter).await {
            Ok(results) => HttpResponse::json(200, &SearchResponse { results }),
            Err(e) => error_response(e),
        }
    }

    async fn stats(&self) -> HttpResponse {
        let rides = match self.store.list_rides().await {
            Ok(r) => r,
            Err(e) => return error_response(e.into()),
        };
        let mut by_status = std::collections::HashMap::new();
        let mut total_fare = rust_decimal::Decimal::ZERO;
        for ride in &rides {
            *by_status.entry(ride.status.as_str().to_string()).or_insert(0u64) += 1;
            total_fare += ride.fare;
        }
        let avg_fare = if rides.is_empty() {
            rust_decimal::Decimal::ZERO
        } else {
            total_fare / rust_decimal::Decimal::from(rides.len())
        };
        let lag = match self.store.health().await {
            Ok(h) => h.replication_lag_ms,
            Err(_) => 0,
        };
        HttpResponse::json(
            200,
            &StatsResponse {
                total: rides.len() as u64,
                by_status,
                avg_fare: avg_fare.to_string(),
                replication_lag_ms: lag,
            },
        )
    }

    async fn metrics_endpoint(&self) -> HttpResponse {
        self.metrics.mark_up();
        HttpResponse::text(200, self.metrics.render())
    }

    async fn health(&self) -> HttpResponse {
        match self.store.health().await {
            Ok(h) => HttpResponse::json(
                200,
                &HealthResponse {
                    status: "AVAILABLE".to_string(),
                    region: self.region.to_string(),
                    primary: h.primary_id,
                    replication_lag_ms: h.replication_lag_ms,
                    last_write_at: h.last_write_at,
                },
            ),
            Err(e) => error_response(e.into()),
        }
    }

    async fn prepare(&self, request: &HttpRequest) -> HttpResponse {
        let req: PrepareRequest = match request.json() {
            Ok(r) => r,
            Err(e) => return HttpResponse::bad_request(format!("invalid prepare body: {e}")),
        };
        match self
            .participant
            .prepare(&req.tx_id, &RideId::new(req.ride_id), req.role)
            .await
        {
            Ok(outcome) => HttpResponse::json(
                200,
                &PrepareResponse {
                    vote: format!("{:?}", outcome.vote).to_uppercase(),
                    reason: outcome.reason.map(|r| r.as_str().to_string()),
                    ride: outcome.ride,
                },
            ),
            Err(e) => error_response(e),
        }
    }

    async fn commit(&self, request: &HttpRequest) -> HttpResponse {
        let req: CommitRequest = match request.json() {
            Ok(r) => r,
            Err(e) => return HttpResponse::bad_request(format!("invalid commit body: {e}")),
        };
        match self
            .participant
            .commit(&req.tx_id, &RideId::new(req.ride_id), req.role, req.ride)
            .await
        {
            Ok(()) => HttpResponse::json(200, &CommitResponse { committed: true }),
            Err(e) => error_response(e),
        }
    }

    async fn abort(&self, request: &HttpRequest) -> HttpResponse {
        let req: AbortRequest = match request.json() {
            Ok(r) => r,
            Err(e) => return HttpResponse::bad_request(format!("invalid abort body: {e}")),
        };
        match self
            .participant
            .abort(&req.tx_id, &RideId::new(req.ride_id), req.role)
            .await
        {
            Ok(()) => HttpResponse::json(200, &AbortResponse { aborted: true }),
            Err(e) => error_response(e),
        }
    }

    async fn status(&self, tx_id: &str) -> HttpResponse {
        match self.participant.status(&TxId::new(tx_id)).await {
            Ok(outcome) => HttpResponse::json(
                200,
                &StatusResponse {
                    present: outcome.present,
                    locked: outcome.locked,
                },
            ),
            Err(e) => error_response(e),
        }
    }
}

fn error_response(err: FleetError) -> HttpResponse {
    let reason = err.reason();
    warn!(reason = reason.as_str(), "participant request failed: {err}");
    HttpResponse::json(
        reason.http_status(),
        &ErrorBody {
            reason: reason.as_str().to_string(),
            message: err.message(),
        },
    )
}
