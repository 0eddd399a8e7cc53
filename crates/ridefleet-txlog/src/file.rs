use crate::record::{decode_one, encode};
use crate::{merge::merge, Log, LogError};
use async_trait::async_trait;
use ridefleet_types::{TransactionRecord, TxId, TxState};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

struct Inner {
    file: File,
    index: HashMap<TxId, TransactionRecord>,
}

/// Append-only, CRC32-checksummed transaction log backed by a single
/// growing file. The in-memory index is rebuilt by a full scan on open;
/// that same scan doubles as the startup recovery enumeration.
pub struct FileLog {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl FileLog {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref().to_path_buf();
        let mut read_file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        let mut data = Vec::new();
        read_file.read_to_end(&mut data)?;

        let mut index = HashMap::new();
        let mut offset = 0usize;
        loop {
            match decode_one(&data[offset..]) {
                Ok(Some((record, consumed))) => {
                    index.insert(record.tx_id.clone(), record);
                    offset += consumed;
                }
                Ok(None) => {
                    if offset < data.len() {
                        warn!(
                            path = %path.display(),
                            "transaction log has a truncated trailing record, ignoring \
                             {} trailing bytes (crash during append)",
                            data.len() - offset
                        );
                    }
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        debug!(path = %path.display(), records = index.len(), "transaction log recovered");

        let file = OpenOptions::new().append(true).open(&path)?;
        Ok(Self {
            path,
            inner: Mutex::new(Inner { file, index }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Log for FileLog {
    async fn append(&self, record: TransactionRecord) -> Result<TransactionRecord, LogError> {
        let mut inner = self.inner.lock().unwrap();
        let merged = merge(inner.index.get(&record.tx_id), record)?;
        let frame = encode(&merged)?;
        inner.file.write_all(&frame)?;
        inner.file.sync_all()?;
        inner.index.insert(merged.tx_id.clone(), merged.clone());
        Ok(merged)
    }

    async fn get(&self, tx_id: &TxId) -> Result<Option<TransactionRecord>, LogError> {
        Ok(self.inner.lock().unwrap().index.get(tx_id).cloned())
    }

    async fn scan(&self, state: Option<TxState>) -> Result<Vec<TransactionRecord>, LogError> {
        let inner = self.inner.lock().unwrap();
        let mut out: Vec<_> = inner
            .index
            .values()
            .filter(|r| state.is_none_or(|s| r.state == s))
            .cloned()
            .collect();
        out.sort_by_key(|r| r.started_at);
        Ok(out)
    }
}
