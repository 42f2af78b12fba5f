//! Local JSON-file sink — appends records to a single JSON array file.
//!
//! Development and test backend; production deployments implement
//! `DealSink` against a real database.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::StoreError;
use crate::store::{DealRecord, DealSink};

/// Appends `DealRecord`s to a JSON array file.
pub struct JsonFileSink {
    path: PathBuf,
    // Serializes the read-modify-write cycle across concurrent saves.
    lock: Mutex<()>,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Read all stored records; a missing file is an empty store.
    pub async fn load(&self) -> Result<Vec<DealRecord>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl DealSink for JsonFileSink {
    async fn save(&self, record: &DealRecord) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;

        let mut records = self.load().await?;
        records.push(record.clone());

        let raw = serde_json::to_vec_pretty(&records)?;
        tokio::fs::write(&self.path, raw).await?;

        debug!(id = %record.id, total = records.len(), "Deal record saved");
        Ok(())
    }
}
