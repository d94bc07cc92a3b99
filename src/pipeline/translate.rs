use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use super::{Intake, ItemPipeline, PipelineStats, StatsSnapshot};
use crate::app_config::{TranslationConfig, TranslationMode};
use crate::database::RecordStore;
use crate::errors::PipelineError;
use crate::providers::Translator;
use crate::record::Record;
use crate::translation::cert_translate;

/// How the translating pipeline talks to the translator
#[derive(Debug, Clone)]
pub struct TranslateOptions {
    /// Language to translate into
    pub target_language: String,
    /// Pause between the content and title requests
    pub delay: Duration,
    /// Separate requests or one packed request
    pub mode: TranslationMode,
    /// Delimiter for packed requests
    pub delimiter: String,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self::from_config(&TranslationConfig::default())
    }
}

impl TranslateOptions {
    /// Options from the translation section of the configuration
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            target_language: config.target_language.clone(),
            delay: Duration::from_millis(config.delay_ms),
            mode: config.mode,
            delimiter: config.delimiter.clone(),
        }
    }

    /// Same options with another delay
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Same options in packed mode with `delimiter`
    pub fn packed(mut self, delimiter: impl Into<String>) -> Self {
        self.mode = TranslationMode::Packed;
        self.delimiter = delimiter.into();
        self
    }
}

/// Stamps, translates and persists every record
///
/// Failed translations never fail the record: the `*_zh` field stays unset and
/// the record is stored anyway.
pub struct TranslatePipeline {
    store: Arc<dyn RecordStore>,
    translator: Arc<dyn Translator>,
    intake: Intake,
    options: TranslateOptions,
    stats: PipelineStats,
}

impl TranslatePipeline {
    /// Create a translating pipeline
    pub fn new(
        store: Arc<dyn RecordStore>,
        translator: Arc<dyn Translator>,
        task_id: impl Into<String>,
        options: TranslateOptions,
    ) -> Self {
        Self {
            store,
            translator,
            intake: Intake::new(task_id.into()),
            options,
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
        let Some((mut record, _claim)) = self.intake.admit(item, &self.stats).await? else {
            return Ok(None);
        };

        match self.options.mode {
            TranslationMode::Separate => self.translate_separately(&mut record).await,
            TranslationMode::Packed => self.translate_packed(&mut record).await,
        }

        if !record.is_translated() {
            self.stats.translation_failed();
        }

        let stored = self.store.save(&record).await?;
        debug!("Stored {} as {} (task {})", record.url, stored.id, self.intake.task_id());
        Ok(Some(record))
    }

    /// Content first, then the title after the configured pause
    async fn translate_separately(&self, record: &mut Record) {
        record.content_zh = self.translate_field(&record.url, "content", &record.content).await;

        if !record.content.is_empty() && !record.title.is_empty() && !self.options.delay.is_zero() {
            tokio::time::sleep(self.options.delay).await;
        }

        record.title_zh = self.translate_field(&record.url, "title", &record.title).await;
    }

    /// One request for both fields; ambiguous splits fall back to two requests
    async fn translate_packed(&self, record: &mut Record) {
        let result = cert_translate(
            self.translator.as_ref(),
            &record.title,
            &record.content,
            &self.options.delimiter,
            &self.options.target_language,
        )
        .await;

        match result {
            Ok(Some(translation)) => match translation.into_fields() {
                Some((title, content)) => {
                    record.title_zh = Some(title);
                    record.content_zh = Some(content);
                }
                None => {
                    warn!(
                        "Delimiter '{}' did not split the translation of {} into two fields, translating separately",
                        self.options.delimiter, record.url
                    );
                    self.translate_separately(record).await;
                }
            },
            Ok(None) => warn!("No translation returned for {}", record.url),
            Err(e) => warn!("Translation unavailable for {}: {}", record.url, e),
        }
    }

    async fn translate_field(&self, url: &str, field: &str, text: &str) -> Option<String> {
        if text.is_empty() {
            return Some(String::new());
        }

        match self
            .translator
            .translate(text, &self.options.target_language)
            .await
        {
            Ok(Some(translated)) => Some(translated),
            Ok(None) => {
                warn!("No {} translation returned for {}", field, url);
                None
            }
            Err(e) => {
                warn!("{} translation unavailable for {}: {}", field, url, e);
                None
            }
        }
    }
}

#[async_trait]
impl ItemPipeline for TranslatePipeline {
    fn name(&self) -> &str {
        "TranslatePipeline"
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
