/*!
 * In-process record store.
 *
 * Keeps records in insertion order behind a read-write lock. Used for dry
 * runs and tests; nothing survives the process.
 */

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

use super::models::StoredRecord;
use super::repository::RecordStore;
use crate::record::Record;

/// Record store backed by a vector
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<StoredRecord>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record
    pub fn records(&self) -> Vec<StoredRecord> {
        self.records.read().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn save(&self, record: &Record) -> Result<StoredRecord> {
        let stored = StoredRecord::new(record.clone());
        self.records.write().push(stored.clone());
        Ok(stored)
    }

    async fn find_one_by_url(&self, url: &str) -> Result<Option<StoredRecord>> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|stored| stored.record.url == url)
            .cloned())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.read().len() as u64)
    }
}
