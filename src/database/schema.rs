/*!
 * Database schema definitions and migrations.
 *
 * This module contains the SQL schema for the record collection tables and
 * tracks the schema version for upgrades.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema and make sure `collection` exists
pub fn initialize_schema(conn: &Connection, collection: &str) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Initializing database schema v{}", SCHEMA_VERSION);
        create_base_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else {
        debug!("Database schema is up to date (v{})", current_version);
    }

    create_collection(conn, collection)
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

fn create_base_tables(conn: &Connection) -> Result<()> {
    // In-memory databases silently stay in "memory" journal mode
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    Ok(())
}

/// Create the table backing a collection
///
/// The index on `url` is not unique; duplicate URLs are only filtered by the
/// pipeline's lookup.
pub fn create_collection(conn: &Connection, collection: &str) -> Result<()> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{table}" (
            id TEXT PRIMARY KEY,
            url TEXT NOT NULL,
            task_id TEXT,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            title_zh TEXT,
            content_zh TEXT,
            extra TEXT NOT NULL DEFAULT '{{}}',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS "idx_{table}_url" ON "{table}"(url);
        CREATE INDEX IF NOT EXISTS "idx_{table}_task" ON "{table}"(task_id);
        "#,
        table = collection
    ))
    .with_context(|| format!("Failed to create collection table '{}'", collection))?;

    debug!("Collection table '{}' ready", collection);
    Ok(())
}
