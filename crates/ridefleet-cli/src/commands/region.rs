//! `region start` - runs a region participant HTTP server.

use super::parse_address;
use anyhow::{Context, Result};
use ridefleet::RegionProcess;
use std::path::Path;
use tracing::info;

pub async fn start(name: &str, address: &str, data_dir: Option<&str>) -> Result<()> {
    let bind_addr = parse_address(address)?;
    let data_dir = data_dir.map(Path::new);

    if let Some(dir) = data_dir {
        std::fs::create_dir_all(dir).context("creating data directory")?;
    }

    let region = RegionProcess::bind(name, data_dir, bind_addr)
        .await
        .context("starting region participant")?;

    info!(region = name, addr = %region.local_addr(), "region participant ready");
    region.serve().await
}
