/*!
 * Item pipelines.
 *
 * A pipeline receives one scraped `Record` at a time, stamps it with the run
 * identifier, optionally enriches it and persists it. Two variants exist:
 * - `StorePipeline`: stamp and store
 * - `TranslatePipeline`: stamp, translate title and content, store
 *
 * `PipelineRunner` drives a stream of records through either variant.
 */

use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::app_config::{Config, PipelineVariant};
use crate::database::RecordStore;
use crate::errors::PipelineError;
use crate::providers::Translator;
use crate::record::Record;

pub mod dedup;
pub mod runner;
pub mod store;
pub mod translate;

pub use dedup::Deduplicator;
pub use runner::{PipelineRunner, RunSummary};
pub use store::StorePipeline;
pub use translate::{TranslateOptions, TranslatePipeline};

/// The `ItemPipeline` trait defines the contract for record pipelines.
#[async_trait]
pub trait ItemPipeline: Send + Sync {
    /// Returns the name of the pipeline.
    fn name(&self) -> &str;

    /// Processes a single record.
    ///
    /// Returns `Ok(None)` when the record was dropped (duplicate URL).
    async fn process_item(&self, item: Record) -> Result<Option<Record>, PipelineError>;

    /// Called once the input is exhausted.
    async fn close(&self) -> Result<(), PipelineError> {
        info!("{} closed: {}", self.name(), self.stats());
        Ok(())
    }

    /// Counters accumulated so far.
    fn stats(&self) -> StatsSnapshot;
}

/// Live counters shared by the pipeline variants
#[derive(Debug, Default)]
pub struct PipelineStats {
    processed: AtomicUsize,
    stored: AtomicUsize,
    duplicates_skipped: AtomicUsize,
    translation_failures: AtomicUsize,
    errors: AtomicUsize,
}

impl PipelineStats {
    /// Account for the outcome of one `process_item` call
    pub fn record_result(&self, result: &Result<Option<Record>, PipelineError>) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        match result {
            Ok(Some(_)) => {
                self.stored.fetch_add(1, Ordering::Relaxed);
            }
            Ok(None) => {}
            Err(_) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Count a record dropped as a duplicate
    pub fn duplicate_skipped(&self) {
        self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a record stored without a complete translation
    pub fn translation_failed(&self) {
        self.translation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of the counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            translation_failures: self.translation_failures.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Copy of the pipeline counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Records received
    pub processed: usize,
    /// Records persisted
    pub stored: usize,
    /// Records dropped because their URL was already stored
    pub duplicates_skipped: usize,
    /// Records stored without a complete translation
    pub translation_failures: usize,
    /// Records that failed with an error
    pub errors: usize,
}

impl std::fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "processed: {}, stored: {}, duplicates skipped: {}, translation failures: {}, errors: {}",
            self.processed,
            self.stored,
            self.duplicates_skipped,
            self.translation_failures,
            self.errors
        )
    }
}

/// First stage shared by both variants: validation, optional dedup, stamping
pub(crate) struct Intake {
    task_id: String,
    dedup: Option<Deduplicator>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

/// URL held by a record between its dedup check and its save
pub(crate) struct UrlClaim {
    url: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl Drop for UrlClaim {
    fn drop(&mut self) {
        self.in_flight.lock().remove(&self.url);
    }
}

impl Intake {
    pub(crate) fn new(task_id: String) -> Self {
        Self {
            task_id,
            dedup: None,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Check URLs against `store` before admitting, or stop checking on `None`
    pub(crate) fn set_dedup(&mut self, store: Option<Arc<dyn RecordStore>>) {
        self.dedup = store.map(Deduplicator::new);
    }

    pub(crate) fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Stamp `record`, or return `None` when its URL is already stored or in flight
    ///
    /// With dedup enabled the returned claim must be kept until the record is
    /// saved; a concurrent record with the same URL is dropped meanwhile.
    pub(crate) async fn admit(
        &self,
        mut record: Record,
        stats: &PipelineStats,
    ) -> Result<Option<(Record, Option<UrlClaim>)>, PipelineError> {
        if record.url.trim().is_empty() {
            return Err(PipelineError::InvalidItem(format!(
                "record has no url (title: '{}')",
                record.title
            )));
        }

        let mut claim = None;
        if let Some(dedup) = &self.dedup {
            let newly_claimed = self.in_flight.lock().insert(record.url.clone());
            if !newly_claimed {
                debug!("Dropping duplicate {} (already in flight)", record.url);
                stats.duplicate_skipped();
                return Ok(None);
            }
            claim = Some(UrlClaim {
                url: record.url.clone(),
                in_flight: self.in_flight.clone(),
            });

            if let Some(existing) = dedup.is_duplicate(&record.url).await? {
                debug!("Dropping duplicate {} (stored as {})", record.url, existing.id);
                stats.duplicate_skipped();
                return Ok(None);
            }
        }

        record.stamp(&self.task_id);
        Ok(Some((record, claim)))
    }
}

/// Build the pipeline variant selected by the configuration
pub fn from_config(
    config: &Config,
    task_id: &str,
    store: Arc<dyn RecordStore>,
    translator: Arc<dyn Translator>,
) -> Arc<dyn ItemPipeline> {
    let drop_duplicates = config.pipeline.drop_duplicates;
    match config.pipeline.variant {
        PipelineVariant::Plain => {
            Arc::new(StorePipeline::new(store, task_id).with_dedup(drop_duplicates))
        }
        PipelineVariant::Translate => Arc::new(
            TranslatePipeline::new(
                store,
                translator,
                task_id,
                TranslateOptions::from_config(&config.translation),
            )
            .with_dedup(drop_duplicates),
        ),
    }
}
