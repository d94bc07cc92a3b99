/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use config_spider::app_config::{
    Config, ENV_DATA_DIR, ENV_DATABASE, ENV_HOST, ENV_PORT, LogLevel, PipelineVariant,
    StoreBackend, TranslationMode,
};
use std::path::PathBuf;

use crate::common::create_temp_dir;

/// Test that a saved configuration loads back unchanged
#[test]
fn test_saveAndLoad_withCustomValues_shouldPreserveThem() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("config-spider.json");

    let mut config = Config::default();
    config.task_id = Some("run-1".to_string());
    config.store.collection = "articles".to_string();
    config.translation.mode = TranslationMode::Packed;
    config.translation.delimiter = "|SEP|".to_string();
    config.pipeline.variant = PipelineVariant::Translate;
    config.pipeline.drop_duplicates = true;
    config.log_level = LogLevel::Debug;
    config.save(&path)?;

    let loaded = Config::load(&path)?;
    assert_eq!(loaded.task_id.as_deref(), Some("run-1"));
    assert_eq!(loaded.store.collection, "articles");
    assert_eq!(loaded.translation.mode, TranslationMode::Packed);
    assert_eq!(loaded.translation.delimiter, "|SEP|");
    assert_eq!(loaded.pipeline.variant, PipelineVariant::Translate);
    assert!(loaded.pipeline.drop_duplicates);
    assert_eq!(loaded.log_level, LogLevel::Debug);
    Ok(())
}

/// Test that missing sections fall back to defaults
#[test]
fn test_load_withPartialFile_shouldFillDefaults() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{"translation": {"app_id": "app", "mode": "packed"}}"#)?;

    let config = Config::load(&path)?;
    assert_eq!(config.translation.app_id, "app");
    assert_eq!(config.translation.mode, TranslationMode::Packed);
    assert_eq!(config.translation.delay_ms, 1500);
    assert_eq!(config.translation.target_language, "zh");
    assert_eq!(config.store.database, "test");
    assert_eq!(config.store.backend, StoreBackend::Mongo);
    assert_eq!(config.store.port, 27017);
    assert_eq!(config.pipeline.concurrency, 1);
    assert!(config.task_id.is_none());
    Ok(())
}

/// Test that a malformed file reports its path
#[test]
fn test_load_withInvalidJson_shouldFailWithContext() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json")?;

    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
    Ok(())
}

/// Test that store location comes from the environment
#[test]
fn test_applyEnvOverrides_withStoreVariables_shouldRedirectStore() {
    let mut config = Config::default();
    config.apply_env_overrides(|name| match name {
        n if n == ENV_DATABASE => Some("crawl".to_string()),
        n if n == ENV_DATA_DIR => Some("/data/spider".to_string()),
        _ => None,
    });

    assert_eq!(
        config.store.database_path().unwrap(),
        PathBuf::from("/data/spider/crawl.db")
    );
}

/// Test that the SQLite backend is chosen by name in the file
#[test]
fn test_load_withSqliteBackend_shouldSelectEmbeddedStore() -> Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("sqlite.json");
    std::fs::write(&path, r#"{"store": {"backend": "sqlite", "collection": "items"}}"#)?;

    let config = Config::load(&path)?;
    assert_eq!(config.store.backend, StoreBackend::Sqlite);
    assert_eq!(config.store.collection, "items");
    assert_eq!(config.store.host, "localhost");
    Ok(())
}

/// Test that the server address comes from the environment
#[test]
fn test_applyEnvOverrides_withServerVariables_shouldRedirectServer() {
    let mut config = Config::default();
    config.apply_env_overrides(|name| match name {
        n if n == ENV_HOST => Some("db.local".to_string()),
        n if n == ENV_PORT => Some("28017".to_string()),
        _ => None,
    });

    assert_eq!(config.store.host, "db.local");
    assert_eq!(config.store.port, 28017);
    assert_eq!(config.store.auth_source, "admin");
}

/// Test configuration validation
#[test]
fn test_validate_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.translation.timeout_secs = 0;
    assert!(config.validate().is_err());
    config.translation.timeout_secs = 10;

    config.pipeline.concurrency = 0;
    assert!(config.validate().is_err());
    config.pipeline.concurrency = 4;

    config.translation.mode = TranslationMode::Packed;
    config.translation.delimiter = String::new();
    assert!(config.validate().is_err());
    config.translation.delimiter = "|SEP|".to_string();

    config.translation.target_language = "  ".to_string();
    assert!(config.validate().is_err());
    config.translation.target_language = "en".to_string();

    config.store.database = "../escape".to_string();
    assert!(config.validate().is_err());
    config.store.database = "crawl_2024".to_string();

    config.store.host = String::new();
    assert!(config.validate().is_err());
    config.store.host = "localhost".to_string();

    assert!(config.validate().is_ok());
}
