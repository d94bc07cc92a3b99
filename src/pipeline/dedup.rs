/*!
 * URL deduplication against the persistent store.
 *
 * A record is a duplicate when a stored record has exactly the same URL. The
 * check is one indexed lookup; an empty store simply has no match.
 */

use anyhow::Result;
use std::sync::Arc;

use crate::database::{RecordStore, StoredRecord};

/// Looks up URLs in the store
#[derive(Clone)]
pub struct Deduplicator {
    store: Arc<dyn RecordStore>,
}

impl Deduplicator {
    /// Create a deduplicator over `store`
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// The stored record with this URL, if any
    pub async fn is_duplicate(&self, url: &str) -> Result<Option<StoredRecord>> {
        self.store.find_one_by_url(url).await
    }
}
