//! `handoff` - one-shot CLI client for submitting a handoff.

use super::parse_address;
use anyhow::{bail, Context, Result};
use ridefleet_net::Method;
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(35);

pub async fn run(coordinator: &str, ride_id: &str, source: &str, target: &str) -> Result<()> {
    let addr = parse_address(coordinator)?;
    let body = serde_json::to_vec(&json!({
        "ride_id": ride_id,
        "source": source,
        "target": target,
    }))?;

    let response = ridefleet_net::send(addr, Method::Post, "/handoff", Some(&body), REQUEST_TIMEOUT)
        .await
        .context("calling coordinator")?;

    let parsed: serde_json::Value =
        serde_json::from_slice(&response.body).context("parsing coordinator response")?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);

    if response.status >= 400 {
        bail!("coordinator returned status {}", response.status);
    }
    Ok(())
}
