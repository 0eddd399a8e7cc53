use anyhow::Result;
use ridefleet_store::{FileStore, InMemoryStore, Store};
use std::sync::Arc;

/// Opens a [`Store`] from a config descriptor: `"memory"` for an
/// [`InMemoryStore`], anything else treated as a snapshot file path for a
/// [`FileStore`]. Mirrors `LogConfig::backend`'s own `"memory"`-or-path
/// convention.
pub fn open_store(primary_id: &str, descriptor: &str) -> Result<Arc<dyn Store>> {
    if descriptor == "memory" {
        return Ok(Arc::new(InMemoryStore::new(primary_id)));
    }
    let store = FileStore::open(descriptor, primary_id)?;
    Ok(Arc::new(store))
}
