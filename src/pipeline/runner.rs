use futures::stream::{Stream, StreamExt};
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use super::{ItemPipeline, StatsSnapshot};
use crate::errors::PipelineError;
use crate::record::Record;

/// Outcome of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Records pulled from the input
    pub received: usize,
    /// Pipeline counters after close
    pub stats: StatsSnapshot,
    /// Wall time of the run
    pub elapsed: Duration,
}

/// Feeds a stream of records through one pipeline
pub struct PipelineRunner {
    pipeline: Arc<dyn ItemPipeline>,
    concurrency: usize,
}

impl PipelineRunner {
    pub fn new(pipeline: Arc<dyn ItemPipeline>, concurrency: usize) -> Self {
        Self {
            pipeline,
            concurrency: concurrency.max(1),
        }
    }

    /// Process every record, then close the pipeline
    ///
    /// A failing record is logged and counted; the run carries on.
    pub async fn run<S>(&self, records: S) -> Result<RunSummary, PipelineError>
    where
        S: Stream<Item = Record> + Send,
    {
        let start = Instant::now();
        let received = AtomicUsize::new(0);
        let pipeline = self.pipeline.as_ref();

        info!(
            "Running {} with concurrency {}",
            pipeline.name(),
            self.concurrency
        );

        records
            .for_each_concurrent(self.concurrency, |record| {
                received.fetch_add(1, Ordering::Relaxed);
                async move {
                    let url = record.url.clone();
                    if let Err(e) = pipeline.process_item(record).await {
                        error!("Failed to process {}: {}", url, e);
                    }
                }
            })
            .await;

        self.pipeline.close().await?;

        Ok(RunSummary {
            received: received.load(Ordering::Relaxed),
            stats: self.pipeline.stats(),
            elapsed: start.elapsed(),
        })
    }
}
