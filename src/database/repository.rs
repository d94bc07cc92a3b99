/*!
 * Record stores.
 *
 * `RecordStore` is the persistence seam the pipelines write through.
 * `SqliteStore` keeps each collection in its own table of a SQLite file.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};

use super::connection::DatabaseConnection;
use super::models::StoredRecord;
use crate::app_config::StoreConfig;
use crate::record::Record;

/// Persistence operations needed by the pipelines
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a record and return the stored row
    async fn save(&self, record: &Record) -> Result<StoredRecord>;

    /// First stored record with exactly this URL
    async fn find_one_by_url(&self, url: &str) -> Result<Option<StoredRecord>>;

    /// Number of stored records
    async fn count(&self) -> Result<u64>;
}

/// SQLite-backed record store
#[derive(Clone)]
pub struct SqliteStore {
    /// Database connection
    db: DatabaseConnection,
}

impl SqliteStore {
    /// Create a store over an existing connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open the store described by the configuration
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let path = config.database_path()?;
        let db = DatabaseConnection::new(&path, &config.collection)
            .with_context(|| format!("Store unavailable at {:?}", path))?;
        info!("Storing into {:?}, collection '{}'", db.path(), config.collection);
        Ok(Self::new(db))
    }

    /// Create a store with an in-memory database (for testing)
    pub fn new_in_memory(collection: &str) -> Result<Self> {
        let db = DatabaseConnection::new_in_memory(collection)?;
        Ok(Self::new(db))
    }

    fn insert_sync(conn: &Connection, table: &str, stored: &StoredRecord) -> Result<()> {
        let record = &stored.record;
        let extra = serde_json::to_string(&record.extra)
            .context("Failed to serialize extra record fields")?;

        conn.execute(
            &format!(
                r#"
                INSERT INTO "{}" (
                    id, url, task_id, title, content, title_zh, content_zh, extra, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
                table
            ),
            params![
                stored.id,
                record.url,
                record.task_id,
                record.title,
                record.content,
                record.title_zh,
                record.content_zh,
                extra,
                stored.created_at,
            ],
        )?;
        Ok(())
    }

    fn find_by_url_sync(conn: &Connection, table: &str, url: &str) -> Result<Option<StoredRecord>> {
        let row = conn
            .query_row(
                &format!(
                    r#"
                    SELECT id, url, task_id, title, content, title_zh, content_zh, extra, created_at
                    FROM "{}" WHERE url = ?1
                    ORDER BY rowid
                    LIMIT 1
                    "#,
                    table
                ),
                [url],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        Record {
                            url: row.get(1)?,
                            task_id: row.get(2)?,
                            title: row.get(3)?,
                            content: row.get(4)?,
                            title_zh: row.get(5)?,
                            content_zh: row.get(6)?,
                            extra: Map::new(),
                        },
                        row.get::<_, String>(7)?,
                        row.get::<_, String>(8)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, mut record, extra, created_at)) = row else {
            return Ok(None);
        };

        record.extra = match serde_json::from_str::<Value>(&extra)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Ok(Some(StoredRecord {
            id,
            record,
            created_at,
        }))
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn save(&self, record: &Record) -> Result<StoredRecord> {
        let stored = StoredRecord::new(record.clone());
        let table = self.db.collection().to_string();
        let row = stored.clone();

        self.db
            .execute_async(move |conn| Self::insert_sync(conn, &table, &row))
            .await?;

        debug!("Saved record {} ({})", stored.id, stored.url());
        Ok(stored)
    }

    async fn find_one_by_url(&self, url: &str) -> Result<Option<StoredRecord>> {
        let table = self.db.collection().to_string();
        let url = url.to_string();

        self.db
            .execute_async(move |conn| Self::find_by_url_sync(conn, &table, &url))
            .await
    }

    async fn count(&self) -> Result<u64> {
        let table = self.db.collection().to_string();

        self.db
            .execute_async(move |conn| {
                let count: i64 =
                    conn.query_row(&format!(r#"SELECT COUNT(*) FROM "{}""#, table), [], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
    }
}
