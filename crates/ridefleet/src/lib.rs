//! Process wiring for ridefleet: turns a [`FleetConfig`] into a running
//! coordinator or region process. `ridefleet-cli` is a thin wrapper around
//! this crate's two process types.

mod coordinator_process;
mod region_process;
mod store;

pub use coordinator_process::CoordinatorProcess;
pub use region_process::RegionProcess;
pub use ridefleet_config::{ConfigLoader, FleetConfig};
