use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::{Intake, ItemPipeline, PipelineStats, StatsSnapshot};
use crate::database::RecordStore;
use crate::errors::PipelineError;
use crate::record::Record;

/// Stamps every record with the run identifier and persists it
pub struct StorePipeline {
    store: Arc<dyn RecordStore>,
    intake: Intake,
    stats: PipelineStats,
}

impl StorePipeline {
    /// Create a pipeline writing to `store` under run `task_id`
    pub fn new(store: Arc<dyn RecordStore>, task_id: impl Into<String>) -> Self {
        Self {
            store,
            intake: Intake::new(task_id.into()),
            stats: PipelineStats::default(),
        }
    }

    /// Drop records whose URL is already stored
    pub fn with_dedup(mut self, enabled: bool) -> Self {
        self.intake.set_dedup(enabled.then(|| self.store.clone()));
        self
    }

    async fn process(&self, item: Record) -> Result<Option<Record>, PipelineError> {
        // the claim is held until the record is saved
        let Some((record, _claim)) = self.intake.admit(item, &self.stats).await? else {
            return Ok(None);
        };

        let stored = self.store.save(&record).await?;
        debug!("Stored {} as {} (task {})", record.url, stored.id, self.intake.task_id());
        Ok(Some(record))
    }
}

#[async_trait]
impl ItemPipeline for StorePipeline {
    fn name(&self) -> &str {
        "StorePipeline"
    }

    async fn process_item(&self, item: Record) -> Result<Option<Record>, PipelineError> {
        let result = self.process(item).await;
        self.stats.record_result(&result);
        result
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}
