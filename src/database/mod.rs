/*!
 * Database module for persistent storage of scraped records.
 *
 * This module provides:
 * - MongoDB persistence, one collection per configured name
 * - SQLite-based persistence, one table per collection
 * - An in-process store for dry runs and tests
 * - The `RecordStore` trait all of them implement
 */

use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::app_config::{StoreBackend, StoreConfig};

pub mod connection;
pub mod memory;
pub mod models;
pub mod mongo;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::DatabaseConnection;
pub use memory::MemoryStore;
pub use models::StoredRecord;
pub use mongo::MongoStore;
pub use repository::{RecordStore, SqliteStore};

/// Open the store selected by `config.backend`
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn RecordStore>> {
    info!("Opening {} store for collection '{}'", config.backend, config.collection);
    let store: Arc<dyn RecordStore> = match config.backend {
        StoreBackend::Mongo => Arc::new(MongoStore::connect(config).await?),
        StoreBackend::Sqlite => Arc::new(SqliteStore::open(config)?),
    };
    Ok(store)
}
