use crate::store::open_store;
use anyhow::{Context, Result};
use ridefleet_net::HttpServer;
use ridefleet_participant::ParticipantServer;
use ridefleet_types::Region;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// A running region: one [`ridefleet_store::Store`] behind one
/// [`ParticipantServer`], bound and serving until the process exits.
pub struct RegionProcess {
    region: Region,
    server: Arc<ParticipantServer>,
    listener: HttpServer,
}

impl RegionProcess {
    /// `data_dir` of `None` runs an in-memory store; `Some(dir)` persists
    /// a JSON snapshot at `<dir>/<region_name>.json`.
    pub async fn bind(region_name: &str, data_dir: Option<&Path>, bind_addr: SocketAddr) -> Result<Self> {
        let store = match data_dir {
            Some(dir) => {
                let path = dir.join(format!("{region_name}.json"));
                open_store(region_name, &path.to_string_lossy()).context("opening region store")?
            }
            None => open_store(region_name, "memory").context("opening region store")?,
        };

        let region = Region::new(region_name);
        let server = Arc::new(ParticipantServer::new(region.clone(), store));
        let listener = HttpServer::bind(bind_addr).await.context("binding region listener")?;

        Ok(Self { region, server, listener })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    pub async fn serve(self) -> Result<()> {
        info!(region = self.region.as_str(), addr = %self.local_addr(), "region participant serving");
        self.listener.serve(self.server).await.context("region listener stopped")
    }
}
