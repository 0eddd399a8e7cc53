use crate::coordinator::Coordinator;
use crate::outcome::OutcomeStatus;
use async_trait::async_trait;
use ridefleet_metrics::Metrics;
use ridefleet_net::{HttpRequest, HttpResponse, Method, RequestHandler};
use ridefleet_router::{Router, Scope};
use ridefleet_types::{Region, RideFilter, RideId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Dispatches the coordinator HTTP surface (spec section 6): submitting
/// handoffs, listing recent transactions, running searches, and reporting
/// region health.
pub struct CoordinatorServer {
    coordinator: Arc<Coordinator>,
    router: Arc<Router>,
    metrics: Metrics,
}

impl CoordinatorServer {
    pub fn new(coordinator: Arc<Coordinator>, router: Arc<Router>) -> Self {
        Self {
            coordinator,
            router,
            metrics: Metrics::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HandoffRequest {
    ride_id: String,
    source: String,
    target: String,
}

#[derive(Debug, Serialize)]
struct HandoffResponse {
    status: OutcomeStatus,
    tx_id: Option<String>,
    latency_ms: u64,
    reason: Option<String>,
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SearchRequestWire {
    scope: Scope,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    status: Option<Vec<ridefleet_types::RideStatus>>,
    #[serde(default)]
    min_fare: Option<rust_decimal::Decimal>,
    #[serde(default)]
    max_fare: Option<rust_decimal::Decimal>,
    #[serde(default)]
    since: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    until: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default = "default_search_limit")]
    limit: usize,
}

fn default_search_limit() -> usize {
    RideFilter::default().limit
}

#[derive(Debug, Serialize)]
struct SearchResponseWire {
    results: Vec<ridefleet_types::Ride>,
    latency_ms: u64,
    regions_queried: Vec<Region>,
    warnings: Vec<String>,
}

#[async_trait]
impl RequestHandler for CoordinatorServer {
    async fn handle(&self, request: HttpRequest) -> HttpResponse {
        let (path, query) = split_path(&request.path);
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        match (request.method, segments.as_slice()) {
            (Method::Post, ["handoff"]) => self.handoff(&request).await,
            (Method::Get, ["transactions"]) => self.transactions(query).await,
            (Method::Post, ["rides", "search"]) => self.search(&request).await,
            (Method::Get, ["health", "regions"]) => self.health_regions().await,
            (Method::Get, ["metrics"]) => self.metrics_endpoint().await,
            (Method::Get, [""]) | (Method::Get, ["health"]) => HttpResponse::text(200, "ok"),
            _ => HttpResponse::not_found(),
        }
    }
}

impl CoordinatorServer {
    async fn handoff(&self, request: &HttpRequest) -> HttpResponse {
        let req: HandoffRequest = match request.json() {
            Ok(r) => r,
            Err(e) => return HttpResponse::bad_request(format!("invalid handoff body: {e}")),
        };

        let result = self
            .coordinator
            .handoff(RideId::new(req.ride_id), Region::new(req.source), Region::new(req.target))
            .await;

        let status_code = match result.status {
            OutcomeStatus::Success => 200,
            OutcomeStatus::Buffered => 202,
            OutcomeStatus::Partial => 202,
            OutcomeStatus::Aborted => result.reason.map(|r| r.http_status()).unwrap_or(200),
        };

        self.metrics
            .handoffs_total
            .with_label_values(&[result.status.as_str()])
            .inc();

        HttpResponse::json(
            status_code,
            &HandoffResponse {
                status: result.status,
                tx_id: result.tx_id.map(|t| t.to_string()),
                latency_ms: result.latency_ms,
                reason: result.reason.map(|r| r.as_str().to_string()),
                detail: result.detail,
            },
        )
    }

    async fn transactions(&self, query: Option<&str>) -> HttpResponse {
        let limit = query
            .and_then(|q| find_query_param(q, "limit"))
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(100);
        let records = self.coordinator.transactions(limit).await;
        HttpResponse::json(200, &records)
    }

    async fn health_regions(&self) -> HttpResponse {
        let snapshot = self.coordinator.health().snapshot();
        HttpResponse::json(200, &snapshot)
    }

    async fn metrics_endpoint(&self) -> HttpResponse {
        let depths = self.coordinator.buffer().depths().await;
        self.metrics.set_buffer_depths(depths.iter().map(|(r, d)| (r, *d)));

        let health = self.coordinator.health();
        let failures: Vec<(Region, u64)> = self
            .coordinator
            .regions()
            .map(|region| (region.clone(), health.probe_failures_total(region)))
            .collect();
        self.metrics.set_probe_failures(failures.iter().map(|(r, c)| (r, *c)));

        HttpResponse::text(200, self.metrics.render())
    }

    async fn search(&self, request: &HttpRequest) -> HttpResponse {
        let req: SearchRequestWire = match request.json() {
            Ok(r) => r,
            Err(e) => return HttpResponse::bad_request(format!("invalid search body: {e}")),
        };

        let filter = RideFilter {
            status: req.status,
            min_fare: req.min_fare,
            max_fare: req.max_fare,
            since: req.since,
            until: req.until,
            limit: req.limit,
        };

        match self.router.search(req.scope, req.region.map(Region::new), filter).await {
            Ok(result) => HttpResponse::json(
                200,
                &SearchResponseWire {
                    results: result.results,
                    latency_ms: result.latency_ms,
                    regions_queried: result.regions_queried,
                    warnings: result.warnings,
                },
            ),
            Err(e) => {
                let reason = e.reason();
                HttpResponse::json(
                    reason.http_status(),
                    &serde_json::json!({ "reason": reason.as_str(), "message": e.message() }),
                )
            }
        }
    }
}

fn split_path(raw: &str) -> (&str, Option<&str>) {
    match raw.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (raw, None),
    }
}

fn find_query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_query_string() {
        assert_eq!(split_path("/transactions?limit=10"), ("/transactions", Some("limit=10")));
        assert_eq!(split_path("/transactions"), ("/transactions", None));
    }

    #[test]
    fn finds_param_in_query() {
        assert_eq!(find_query_param("limit=10&foo=bar", "limit"), Some("10"));
        assert_eq!(find_query_param("foo=bar", "limit"), None);
    }
}
