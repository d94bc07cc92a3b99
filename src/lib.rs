/*!
 * # config-spider - item pipelines for generated crawlers
 *
 * A Rust library for the post-processing stage of configurable spiders:
 * every scraped record is stamped with the run identifier, optionally
 * translated and persisted.
 *
 * ## Features
 *
 * - MD5 fingerprints for text and random identifiers
 * - Baidu general translation API client with signed requests
 * - Packing title and content into a single translation call
 * - URL deduplication against the record store
 * - Plain and translating pipeline variants
 * - MongoDB persistence, with SQLite as the embedded alternative
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management and environment overrides
 * - `record`: The scraped record model
 * - `hashing`: MD5 fingerprints
 * - `urls`: Resolving scraped links against the page URL
 * - `providers`: Translation clients:
 *   - `providers::baidu`: Baidu translation API client
 *   - `providers::mock`: In-process translator for tests and dry runs
 * - `translation`: Pack/unpack codec for one-call translation
 * - `database`: Record persistence
 * - `pipeline`: Item pipelines and the runner that drives them
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod database;
pub mod errors;
pub mod hashing;
pub mod pipeline;
pub mod providers;
pub mod record;
pub mod translation;
pub mod urls;

// Re-export main types for easier usage
pub use app_config::Config;
pub use database::{MemoryStore, MongoStore, RecordStore, SqliteStore};
pub use errors::{PipelineError, ProviderError};
pub use hashing::fingerprint;
pub use pipeline::{ItemPipeline, PipelineRunner, StorePipeline, TranslatePipeline};
pub use providers::{BaiduTranslator, Translator};
pub use record::Record;
