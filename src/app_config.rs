use anyhow::{Context, Result, anyhow};
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles loading, overriding, validating and saving the
/// configuration that every pipeline and client is constructed from.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Run identifier stamped on every record
    #[serde(default)]
    pub task_id: Option<String>,

    /// Persistent store settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Translation API settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Pipeline settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Environment variable holding the run identifier
pub const ENV_TASK_ID: &str = "CRAWLAB_TASK_ID";
/// Environment variable holding the store host
pub const ENV_HOST: &str = "CRAWLAB_MONGO_HOST";
/// Environment variable holding the store port
pub const ENV_PORT: &str = "CRAWLAB_MONGO_PORT";
/// Environment variable holding the store user name
pub const ENV_USERNAME: &str = "CRAWLAB_MONGO_USERNAME";
/// Environment variable holding the store password
pub const ENV_PASSWORD: &str = "CRAWLAB_MONGO_PASSWORD";
/// Environment variable holding the database credentials are checked against
pub const ENV_AUTH_SOURCE: &str = "CRAWLAB_MONGO_AUTHSOURCE";
/// Environment variable holding the database name
pub const ENV_DATABASE: &str = "CRAWLAB_MONGO_DB";
/// Environment variable holding the collection name
pub const ENV_COLLECTION: &str = "CRAWLAB_COLLECTION";
/// Environment variable holding the store data directory
pub const ENV_DATA_DIR: &str = "CRAWLAB_DATA_DIR";
/// Environment variable holding the translation app id
pub const ENV_APP_ID: &str = "CRAWLAB_TRANSLATE_APPID";
/// Environment variable holding the translation secret
pub const ENV_SECRET: &str = "CRAWLAB_TRANSLATE_SECRET";

/// Directory name under the user's data directory
const DEFAULT_DATA_DIRNAME: &str = "config-spider";

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

/// Where records are persisted
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// MongoDB server at `host:port`
    #[default]
    Mongo,
    /// Embedded SQLite file under `data_dir`
    Sqlite,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mongo => write!(f, "mongo"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Persistent store configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    /// Backend the records go to
    #[serde(default)]
    pub backend: StoreBackend,

    /// Server host
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// User name; no credentials are sent when empty
    #[serde(default = "String::new")]
    pub username: String,

    /// Password
    #[serde(default = "String::new")]
    pub password: String,

    /// Database the credentials are checked against
    #[serde(default = "default_auth_source")]
    pub auth_source: String,

    /// Database name; for SQLite the file is `<data_dir>/<database>.db`
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection name; SQLite stores it as a table of that name
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Directory holding the SQLite file (defaults to the platform data dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            host: default_host(),
            port: default_port(),
            username: String::new(),
            password: String::new(),
            auth_source: default_auth_source(),
            database: default_database(),
            collection: default_collection(),
            data_dir: None,
        }
    }
}

impl StoreConfig {
    /// Full path of the database file
    pub fn database_path(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .or_else(dirs::data_dir)
                .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
                .ok_or_else(|| anyhow!("Could not determine data directory"))?
                .join(DEFAULT_DATA_DIRNAME),
        };
        Ok(dir.join(format!("{}.db", self.database)))
    }
}

/// How the translating pipeline sends title and content
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// Two requests, content first, with a delay in between
    #[default]
    Separate,
    /// One request carrying title and content joined by the delimiter
    Packed,
}

/// Translation API configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// API endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Application id
    #[serde(default = "String::new")]
    pub app_id: String,

    /// Shared secret
    #[serde(default = "String::new")]
    pub secret: String,

    /// Language the translating pipeline translates into
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between the two requests made for one record, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Request layout
    #[serde(default)]
    pub mode: TranslationMode,

    /// Delimiter used in packed mode
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            app_id: String::new(),
            secret: String::new(),
            target_language: default_target_language(),
            timeout_secs: default_timeout_secs(),
            delay_ms: default_delay_ms(),
            mode: TranslationMode::default(),
            delimiter: default_delimiter(),
        }
    }
}

/// Which pipeline variant to run
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PipelineVariant {
    /// Stamp and store
    #[default]
    Plain,
    /// Stamp, translate and store
    Translate,
}

impl std::fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Translate => write!(f, "translate"),
        }
    }
}

impl std::str::FromStr for PipelineVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "translate" => Ok(Self::Translate),
            _ => Err(anyhow!("Invalid pipeline variant: {}", s)),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    /// Variant to run
    #[serde(default)]
    pub variant: PipelineVariant,

    /// Drop records whose URL is already stored
    #[serde(default)]
    pub drop_duplicates: bool,

    /// Records processed at the same time by the runner
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            variant: PipelineVariant::default(),
            drop_duplicates: false,
            concurrency: default_concurrency(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    27017
}

fn default_auth_source() -> String {
    "admin".to_string()
}

fn default_database() -> String {
    "test".to_string()
}

fn default_collection() -> String {
    "test".to_string()
}

fn default_endpoint() -> String {
    crate::providers::baidu::DEFAULT_ENDPOINT.to_string()
}

fn default_target_language() -> String {
    "zh".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_delay_ms() -> u64 {
    1500 // between the content and title requests of one record
}

fn default_delimiter() -> String {
    crate::translation::DEFAULT_DELIMITER.to_string()
}

fn default_concurrency() -> usize {
    1
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Write configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {:?}", path))
    }

    /// Override values from environment-style variables
    ///
    /// `lookup` is normally `std::env::var(..).ok()`; empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(task_id) = get(ENV_TASK_ID) {
            self.task_id = Some(task_id);
        }
        if let Some(host) = get(ENV_HOST) {
            self.store.host = host;
        }
        if let Some(port) = get(ENV_PORT) {
            match port.trim().parse::<u16>() {
                Ok(port) => self.store.port = port,
                Err(_) => warn!("Ignoring invalid {}: '{}'", ENV_PORT, port),
            }
        }
        if let Some(username) = get(ENV_USERNAME) {
            self.store.username = username;
        }
        if let Some(password) = get(ENV_PASSWORD) {
            self.store.password = password;
        }
        if let Some(auth_source) = get(ENV_AUTH_SOURCE) {
            self.store.auth_source = auth_source;
        }
        if let Some(database) = get(ENV_DATABASE) {
            self.store.database = database;
        }
        if let Some(collection) = get(ENV_COLLECTION) {
            self.store.collection = collection;
        }
        if let Some(data_dir) = get(ENV_DATA_DIR) {
            self.store.data_dir = Some(PathBuf::from(data_dir));
        }
        if let Some(app_id) = get(ENV_APP_ID) {
            self.translation.app_id = app_id;
        }
        if let Some(secret) = get(ENV_SECRET) {
            self.translation.secret = secret;
        }
    }

    /// Return the run identifier, generating one when none is configured
    pub fn ensure_task_id(&mut self) -> String {
        self.task_id
            .get_or_insert_with(|| uuid::Uuid::new_v4().to_string())
            .clone()
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if !PLAIN_IDENTIFIER.is_match(&self.store.database) {
            return Err(anyhow!("Invalid database name: '{}'", self.store.database));
        }
        if !PLAIN_IDENTIFIER.is_match(&self.store.collection) {
            return Err(anyhow!("Invalid collection name: '{}'", self.store.collection));
        }
        if self.store.backend == StoreBackend::Mongo {
            if self.store.host.trim().is_empty() {
                return Err(anyhow!("Store host must not be empty"));
            }
            if self.store.port == 0 {
                return Err(anyhow!("Store port must not be 0"));
            }
        }

        if self.translation.target_language.trim().is_empty() {
            return Err(anyhow!("Translation target language must not be empty"));
        }
        if self.translation.timeout_secs == 0 {
            return Err(anyhow!("Translation timeout must be at least one second"));
        }
        if self.translation.mode == TranslationMode::Packed && self.translation.delimiter.is_empty() {
            return Err(anyhow!("Packed translation mode needs a non-empty delimiter"));
        }

        if self.pipeline.concurrency == 0 {
            return Err(anyhow!("Pipeline concurrency must be at least 1"));
        }

        Ok(())
    }
}
