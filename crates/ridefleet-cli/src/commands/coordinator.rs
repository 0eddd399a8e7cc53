//! `coordinator start` - runs the coordinator and query router HTTP server.

use super::parse_address;
use anyhow::{Context, Result};
use ridefleet::{CoordinatorProcess, ConfigLoader};
use std::path::Path;
use tracing::info;

pub async fn start(address: &str, config_path: Option<&str>) -> Result<()> {
    let bind_addr = parse_address(address)?;

    let mut loader = ConfigLoader::new();
    if let Some(path) = config_path {
        let dir = Path::new(path).parent().unwrap_or_else(|| Path::new("."));
        loader = loader.with_project_dir(dir);
    }
    let config = loader.load().context("loading configuration")?;

    let coordinator = CoordinatorProcess::bind(&config, bind_addr)
        .await
        .context("starting coordinator")?;

    info!(addr = %coordinator.local_addr(), regions = config.regions.len(), "coordinator ready");
    coordinator.serve().await
}
