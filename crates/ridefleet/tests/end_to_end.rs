//! End-to-end wiring test: two region processes and a coordinator process,
//! all bound to real ports, exercised entirely over HTTP.

use chrono::Utc;
use ridefleet::{CoordinatorProcess, FleetConfig, RegionProcess};
use ridefleet_net::Method;
use ridefleet_types::{HandoffStatus, Region, Ride, RideId, RideStatus};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

fn sample_ride(id: &str, region: &str) -> Ride {
    Ride {
        ride_id: RideId::new(id),
        vehicle_id: "v1".into(),
        customer_id: "c1".into(),
        status: RideStatus::InProgress,
        fare: Decimal::new(4200, 2),
        region: Region::new(region),
        start_lat: 34.0,
        start_lon: -118.2,
        current_lat: 34.0,
        current_lon: -118.2,
        end_lat: None,
        end_lon: None,
        updated_at: Utc::now(),
        locked: false,
        transaction_id: None,
        handoff_status: HandoffStatus::None,
    }
}

async fn spawn_region(name: &str) -> SocketAddr {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let region = RegionProcess::bind(name, None, addr).await.unwrap();
    let bound = region.local_addr();
    tokio::spawn(region.serve());
    bound
}

async fn post_json(addr: SocketAddr, path: &str, body: &serde_json::Value) -> (u16, serde_json::Value) {
    let bytes = serde_json::to_vec(body).unwrap();
    let response = ridefleet_net::send(addr, Method::Post, path, Some(&bytes), Duration::from_secs(5))
        .await
        .unwrap();
    let parsed = serde_json::from_slice(&response.body).unwrap_or(serde_json::Value::Null);
    (response.status, parsed)
}

#[tokio::test]
async fn handoff_and_search_over_http() {
    let west_addr = spawn_region("us-west").await;
    let east_addr = spawn_region("us-east").await;

    let ride = sample_ride("ride-e2e-1", "us-west");
    let (status, _) = post_json(west_addr, "/rides", &serde_json::to_value(&ride).unwrap()).await;
    assert_eq!(status, 201);

    let mut regions = HashMap::new();
    regions.insert("us-west".to_string(), format!("http://{west_addr}"));
    regions.insert("us-east".to_string(), format!("http://{east_addr}"));
    let config = FleetConfig {
        regions,
        ..FleetConfig::default()
    };

    let coordinator_addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let coordinator = CoordinatorProcess::bind(&config, coordinator_addr).await.unwrap();
    let bound = coordinator.local_addr();
    tokio::spawn(coordinator.serve());

    let (status, body) = post_json(
        bound,
        "/handoff",
        &serde_json::json!({"ride_id": "ride-e2e-1", "source": "us-west", "target": "us-east"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "SUCCESS");

    let (status, body) = post_json(
        bound,
        "/rides/search",
        &serde_json::json!({"scope": "global-live"}),
    )
    .await;
    assert_eq!(status, 200);
    let results = body["results"].as_array().unwrap();
    assert!(results.iter().any(|r| r["ride_id"] == "ride-e2e-1"));
}
