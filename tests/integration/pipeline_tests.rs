/*!
 * End-to-end tests: records through pipelines into the SQLite store
 */

use anyhow::Result;
use config_spider::app_config::{Config, PipelineVariant, TranslationMode};
use config_spider::database::{RecordStore, SqliteStore};
use config_spider::pipeline::{self, ItemPipeline, PipelineRunner, StorePipeline, TranslateOptions, TranslatePipeline};
use config_spider::providers::mock::MockBehavior;
use config_spider::providers::{BaiduTranslator, MockTranslator, Translator};
use config_spider::record::Record;
use futures::stream;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer};

use crate::common::{EchoResponder, create_temp_dir, init_logging, sample_records, store_config};

/// Packed translation through a real HTTP round trip fills both fields
#[tokio::test]
async fn test_translatePipeline_withEchoEndpointAndPackedMode_shouldFillBothFields() -> Result<()> {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(EchoResponder)
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.translation.endpoint = server.uri();
    config.translation.app_id = "app".to_string();
    config.translation.secret = "secret".to_string();
    config.translation.mode = TranslationMode::Packed;
    config.translation.delimiter = "|SEP|".to_string();

    let store = Arc::new(SqliteStore::new_in_memory("items")?);
    let translator = Arc::new(BaiduTranslator::from_config(&config.translation));
    let pipeline = TranslatePipeline::new(
        store.clone(),
        translator,
        "run-42",
        TranslateOptions::from_config(&config.translation),
    );

    let out = pipeline
        .process_item(Record::new("Hello", "World", "http://x"))
        .await?
        .expect("record should be kept");

    assert_eq!(out.title_zh.as_deref(), Some("Hello"));
    assert_eq!(out.content_zh.as_deref(), Some("World"));
    assert_eq!(out.task_id.as_deref(), Some("run-42"));

    let stored = store.find_one_by_url("http://x").await?.expect("record should be stored");
    assert_eq!(stored.record, out);
    Ok(())
}

/// The default separate mode sends content, then title
#[tokio::test]
async fn test_translatePipeline_withEchoEndpointAndSeparateMode_shouldSendTwoRequests() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(EchoResponder)
        .expect(2)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.translation.endpoint = server.uri();
    let options = TranslateOptions::from_config(&config.translation).with_delay(Duration::from_millis(20));

    let store = Arc::new(SqliteStore::new_in_memory("items")?);
    let pipeline = TranslatePipeline::new(
        store.clone(),
        Arc::new(BaiduTranslator::from_config(&config.translation)),
        "run",
        options,
    );

    let out = pipeline
        .process_item(Record::new("Hello", "World", "http://x"))
        .await?
        .expect("record should be kept");

    assert_eq!(out.title_zh.as_deref(), Some("Hello"));
    assert_eq!(out.content_zh.as_deref(), Some("World"));
    assert!(out.is_translated());
    Ok(())
}

/// The store keeps extra fields and the stamp across reopening the file
#[tokio::test]
async fn test_runner_withSqliteOnDisk_shouldPersistEveryRecord() -> Result<()> {
    let dir = create_temp_dir()?;
    let config = store_config(&dir, "articles");

    {
        let store = Arc::new(SqliteStore::open(&config)?);
        let runner = PipelineRunner::new(Arc::new(StorePipeline::new(store, "run-1")), 2);
        let summary = runner.run(stream::iter(sample_records())).await?;
        assert_eq!(summary.received, 3);
        assert_eq!(summary.stats.stored, 3);
        assert_eq!(summary.stats.errors, 0);
    }

    let reopened = SqliteStore::open(&config)?;
    assert_eq!(reopened.count().await?, 3);

    let second = reopened
        .find_one_by_url("http://example.com/2")
        .await?
        .expect("record should survive reopening");
    assert_eq!(second.record.task_id.as_deref(), Some("run-1"));
    assert_eq!(second.record.extra.get("author"), Some(&serde_json::json!("someone")));
    assert!(second.record.title_zh.is_none());
    Ok(())
}

/// A second run with dedup enabled skips everything the first run stored
#[tokio::test]
async fn test_runner_withDropDuplicates_shouldSkipStoredUrls() -> Result<()> {
    let dir = create_temp_dir()?;
    let mut config = Config::default();
    config.store = store_config(&dir, "articles");
    config.pipeline.drop_duplicates = true;

    let store: Arc<dyn RecordStore> = Arc::new(SqliteStore::open(&config.store)?);
    let translator: Arc<dyn Translator> = Arc::new(MockTranslator::echo());

    for expected_stored in [3, 0] {
        let pipeline = pipeline::from_config(&config, "run", store.clone(), translator.clone());
        let summary = PipelineRunner::new(pipeline, 1)
            .run(stream::iter(sample_records()))
            .await?;
        assert_eq!(summary.stats.stored, expected_stored);
        assert_eq!(summary.stats.duplicates_skipped, 3 - expected_stored);
    }

    assert_eq!(store.count().await?, 3);
    Ok(())
}

/// Records from a JSON-lines input run through the translating variant
#[tokio::test]
async fn test_runner_withJsonLinesInputAndFailingTranslator_shouldStillStore() -> Result<()> {
    let input = r#"{"title": "One", "content": "First", "url": "http://a"}
{"title": "Two", "content": "Second", "url": "http://b", "lang": "en"}
"#;
    let records = Record::from_json_lines(input)?;

    let mut config = Config::default();
    config.pipeline.variant = PipelineVariant::Translate;
    config.pipeline.concurrency = 2;
    config.translation.delay_ms = 0;

    let store = Arc::new(SqliteStore::new_in_memory("test")?);
    let pipeline = pipeline::from_config(&config, "run", store.clone(), Arc::new(MockTranslator::failing()));
    assert_eq!(pipeline.name(), "TranslatePipeline");

    let summary = PipelineRunner::new(pipeline, config.pipeline.concurrency)
        .run(stream::iter(records))
        .await?;

    assert_eq!(summary.stats.stored, 2);
    assert_eq!(summary.stats.translation_failures, 2);
    let stored = store.find_one_by_url("http://b").await?.expect("record should be stored");
    assert!(stored.record.content_zh.is_none());
    assert_eq!(stored.record.extra.get("lang"), Some(&serde_json::json!("en")));
    Ok(())
}

/// Concurrent items each wait out their own delay rather than queueing
#[tokio::test]
async fn test_runner_withConcurrency_shouldOverlapDelays() -> Result<()> {
    let store = Arc::new(SqliteStore::new_in_memory("test")?);
    let options = TranslateOptions::default().with_delay(Duration::from_millis(200));
    let pipeline = Arc::new(TranslatePipeline::new(
        store,
        Arc::new(MockTranslator::new(MockBehavior::Slow { delay_ms: 50 })),
        "run",
        options,
    ));

    let records: Vec<Record> = (0..4)
        .map(|i| Record::new(format!("t{}", i), format!("c{}", i), format!("http://x/{}", i)))
        .collect();
    let summary = PipelineRunner::new(pipeline, 4).run(stream::iter(records)).await?;

    assert_eq!(summary.stats.stored, 4);
    assert!(summary.elapsed >= Duration::from_millis(300));
    assert!(summary.elapsed < Duration::from_millis(1000));
    Ok(())
}

/// Same URL twice in one concurrent run is stored once
#[tokio::test]
async fn test_runner_withDropDuplicatesAndConcurrency_shouldStoreSameUrlOnce() -> Result<()> {
    let store = Arc::new(SqliteStore::new_in_memory("test")?);
    let pipeline = Arc::new(
        TranslatePipeline::new(
            store.clone(),
            Arc::new(MockTranslator::new(MockBehavior::Slow { delay_ms: 50 })),
            "run",
            TranslateOptions::default().with_delay(Duration::ZERO),
        )
        .with_dedup(true),
    );

    let records = vec![
        Record::new("first", "a", "http://same"),
        Record::new("second", "b", "http://same"),
    ];
    let summary = PipelineRunner::new(pipeline, 2).run(stream::iter(records)).await?;

    assert_eq!(summary.stats.processed, 2);
    assert_eq!(summary.stats.stored, 1);
    assert_eq!(summary.stats.duplicates_skipped, 1);
    assert_eq!(store.count().await?, 1);
    Ok(())
}

/// A record without a URL fails alone; the rest of the run is stored
#[tokio::test]
async fn test_runner_withMissingUrl_shouldCountErrorAndContinue() -> Result<()> {
    let store = Arc::new(SqliteStore::new_in_memory("test")?);
    let runner = PipelineRunner::new(Arc::new(StorePipeline::new(store.clone(), "run")), 1);

    let records = vec![Record::new("no url", "x", ""), Record::new("ok", "y", "http://ok")];
    let summary = runner.run(stream::iter(records)).await?;

    assert_eq!(summary.stats.errors, 1);
    assert_eq!(summary.stats.stored, 1);
    assert_eq!(store.count().await?, 1);
    Ok(())
}
