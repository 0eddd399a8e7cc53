pub mod coordinator;
pub mod handoff;
pub mod region;
pub mod transactions;

use anyhow::{bail, Result};
use std::net::SocketAddr;

/// Accepts a port-only address ("8080") or a full address
/// ("127.0.0.1:8080").
pub fn parse_address(address: &str) -> Result<SocketAddr> {
    if let Ok(addr) = address.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(port) = address.parse::<u16>() {
        return Ok(SocketAddr::from(([127, 0, 0, 1], port)));
    }
    bail!("invalid address '{address}'. Use a port (e.g., '8080') or full address (e.g., '127.0.0.1:8080')");
}
