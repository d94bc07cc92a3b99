/*!
 * Database entity models.
 *
 * These structures map directly to collection rows and provide type-safe
 * access to persisted records.
 */

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// A record as persisted in a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Row identifier (UUID v4)
    #[serde(rename = "_id")]
    pub id: String,
    /// The persisted record
    #[serde(flatten)]
    pub record: Record,
    /// Insertion timestamp (RFC 3339)
    pub created_at: String,
}

impl StoredRecord {
    /// Wrap a record with a fresh id and timestamp
    pub fn new(record: Record) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            record,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// URL of the stored record
    pub fn url(&self) -> &str {
        &self.record.url
    }
}
