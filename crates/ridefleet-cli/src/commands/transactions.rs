//! `transactions` - lists recent transactions from a running coordinator.

use super::parse_address;
use anyhow::{bail, Context, Result};
use ridefleet_net::Method;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn run(coordinator: &str, limit: usize) -> Result<()> {
    let addr = parse_address(coordinator)?;
    let path = format!("/transactions?limit={limit}");

    let response = ridefleet_net::send(addr, Method::Get, &path, None, REQUEST_TIMEOUT)
        .await
        .context("calling coordinator")?;

    if response.status >= 400 {
        bail!("coordinator returned status {}", response.status);
    }

    let parsed: serde_json::Value =
        serde_json::from_slice(&response.body).context("parsing coordinator response")?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}
