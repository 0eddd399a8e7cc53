use crate::{InMemoryStore, Store, StoreError, StoreHealth};
use async_trait::async_trait;
use ridefleet_types::{Ride, RideId, TxId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// A [`Store`] that persists the ride table to a single JSON snapshot file
/// after every mutation, so a single-process region survives a restart
/// without external infrastructure. Durability window is "last mutation
/// fsync'd"; this is not a segmented, checksummed log like the transaction
/// log — the ride table is small and fully rewritten, not appended to.
pub struct FileStore {
    inner: InMemoryStore,
    path: PathBuf,
    persist_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (or creates) a file-backed store at `path`, loading any
    /// existing snapshot.
    pub fn open(path: impl AsRef<Path>, primary_id: impl Into<String>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let inner = InMemoryStore::new(primary_id);

        if path.exists() {
            let data = std::fs::read(&path)?;
            if !data.is_empty() {
                let rides: HashMap<RideId, Ride> = serde_json::from_slice(&data)
                    .map_err(|e| StoreError::Io(format!("corrupt snapshot: {e}")))?;
                for ride in rides.into_values() {
                    inner.seed(ride);
                }
            }
        }

        Ok(Self {
            inner,
            path,
            persist_lock: Mutex::new(()),
        })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let _guard = self.persist_lock.lock().unwrap();
        let rides = self.inner.snapshot();
        let data = serde_json::to_vec(&rides)
            .map_err(|e| StoreError::Io(format!("snapshot encode failed: {e}")))?;
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, &data)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get_ride(&self, ride_id: &RideId) -> Result<Option<Ride>, StoreError> {
        self.inner.get_ride(ride_id).await
    }

    async fn insert_ride(&self, ride: Ride) -> Result<(), StoreError> {
        self.inner.insert_ride(ride).await?;
        if let Err(e) = self.persist() {
            warn!("failed to persist store snapshot: {e}");
        }
        Ok(())
    }

    async fn delete_ride(&self, ride_id: &RideId, tx_id: &TxId) -> Result<(), StoreError> {
        self.inner.delete_ride(ride_id, tx_id).await?;
        if let Err(e) = self.persist() {
            warn!("failed to persist store snapshot: {e}");
        }
        Ok(())
    }

    async fn lock(&self, ride_id: &RideId, tx_id: &TxId) -> Result<Ride, StoreError> {
        let ride = self.inner.lock(ride_id, tx_id).await?;
        if let Err(e) = self.persist() {
            warn!("failed to persist store snapshot: {e}");
        }
        Ok(ride)
    }

    async fn unlock(&self, ride_id: &RideId, tx_id: &TxId) -> Result<(), StoreError> {
        self.inner.unlock(ride_id, tx_id).await?;
        if let Err(e) = self.persist() {
            warn!("failed to persist store snapshot: {e}");
        }
        Ok(())
    }

    async fn finalize(&self, ride_id: &RideId, tx_id: &TxId) -> Result<(), StoreError> {
        self.inner.finalize(ride_id, tx_id).await?;
        if let Err(e) = self.persist() {
            warn!("failed to persist store snapshot: {e}");
        }
        Ok(())
    }

    async fn health(&self) -> Result<StoreHealth, StoreError> {
        self.inner.health().await
    }

    async fn find_by_transaction(&self, tx_id: &TxId) -> Result<Option<Ride>, StoreError> {
        self.inner.find_by_transaction(tx_id).await
    }

    async fn remove_ride_unconditional(&self, ride_id: &RideId) -> Result<bool, StoreError> {
        let removed = self.inner.remove_ride_unconditional(ride_id).await?;
        if let Err(e) = self.persist() {
            warn!("failed to persist store snapshot: {e}");
        }
        Ok(removed)
    }

    async fn list_rides(&self) -> Result<Vec<Ride>, StoreError> {
        self.inner.list_rides().await
    }
}
