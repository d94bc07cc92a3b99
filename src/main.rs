// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use futures::stream;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use config_spider::app_config::{self, Config, PipelineVariant};
use config_spider::database::{self, MemoryStore, RecordStore};
use config_spider::providers::{BaiduTranslator, MockTranslator, Translator};
use config_spider::{hashing, pipeline, urls};

/// CLI Wrapper for PipelineVariant to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliPipelineVariant {
    Plain,
    Translate,
}

impl From<CliPipelineVariant> for PipelineVariant {
    fn from(cli_variant: CliPipelineVariant) -> Self {
        match cli_variant {
            CliPipelineVariant::Plain => PipelineVariant::Plain,
            CliPipelineVariant::Translate => PipelineVariant::Translate,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a pipeline over records read from a JSON-lines file
    Run(RunArgs),

    /// Translate one piece of text with the configured API
    Translate {
        /// Text to translate
        text: String,

        /// Target language code (defaults to the configured one)
        #[arg(short, long)]
        target_language: Option<String>,
    },

    /// Show the stored record for a URL, if any
    CheckUrl {
        /// URL to look up
        url: String,
    },

    /// Print the MD5 fingerprint of a text, or a random one
    Hash {
        /// Text to fingerprint
        text: Option<String>,
    },

    /// Resolve a scraped link against the page it was found on
    ResolveUrl {
        /// URL of the page
        page_url: String,

        /// Link as found on the page
        href: String,
    },
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// JSON-lines file with one record per line ('-' reads stdin)
    #[arg(short, long, value_name = "INPUT_PATH")]
    input: PathBuf,

    /// Pipeline variant to run
    #[arg(short, long, value_enum)]
    variant: Option<CliPipelineVariant>,

    /// Drop records whose URL is already stored
    #[arg(short, long)]
    drop_duplicates: bool,

    /// Records processed at the same time
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Run identifier stamped on every record
    #[arg(long)]
    task_id: Option<String>,

    /// Keep records in memory and echo translations instead of calling the API
    #[arg(long)]
    dry_run: bool,
}

/// config-spider - item pipelines for generated crawlers
///
/// Stamps scraped records with the run identifier, optionally translates
/// their title and content, and stores them.
#[derive(Parser, Debug)]
#[command(name = "config-spider")]
#[command(version)]
#[command(about = "Item pipelines for generated crawlers")]
#[command(long_about = "config-spider stamps, optionally translates and stores records scraped by generated spiders.

EXAMPLES:
    config-spider run -i items.jsonl                     # Store records with the plain pipeline
    config-spider run -i items.jsonl -v translate        # Translate title and content before storing
    config-spider run -i items.jsonl -d -c 4             # Skip stored URLs, four records at a time
    config-spider run -i - --dry-run < items.jsonl       # Try a run without touching the store or API
    config-spider translate 'Hello world'                # Translate one text
    config-spider check-url https://example.com/a        # Look up a stored URL
    config-spider resolve-url https://example.com/a/ b   # Resolve a relative link

CONFIGURATION:
    Configuration is stored in config-spider.json by default. You can specify a
    different file with --config-path. If the file doesn't exist, a default one
    will be created automatically. CRAWLAB_* environment variables override it.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short = 'f', long, default_value = "config-spider.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with the most verbose level
    // The effective level is lowered through set_max_level once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(cmd_log_level) = &cli.log_level {
        log::set_max_level(level_filter(&cmd_log_level.clone().into()));
    }

    let mut config = load_config(&cli.config_path)?;
    config.apply_env_overrides(|name| std::env::var(name).ok());

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(level_filter(&config.log_level));
    }

    match cli.command {
        Commands::Run(args) => run_pipeline(config, args).await,
        Commands::Translate {
            text,
            target_language,
        } => {
            config.validate().context("Configuration validation failed")?;
            let target = target_language.unwrap_or_else(|| config.translation.target_language.clone());
            let translator = BaiduTranslator::from_config(&config.translation);
            match translator.translate(&text, &target).await? {
                Some(translated) => println!("{}", translated),
                None => warn!("The API returned no translation"),
            }
            Ok(())
        }
        Commands::CheckUrl { url } => {
            config.validate().context("Configuration validation failed")?;
            let store = database::open_store(&config.store).await?;
            match store.find_one_by_url(&url).await? {
                Some(stored) => println!("{}", serde_json::to_string_pretty(&stored)?),
                None => info!("{} is not stored in '{}'", url, config.store.collection),
            }
            Ok(())
        }
        Commands::Hash { text } => {
            println!("{}", hashing::fingerprint(text.as_deref()));
            Ok(())
        }
        Commands::ResolveUrl { page_url, href } => {
            println!("{}", urls::resolve_url(&page_url, &href)?);
            Ok(())
        }
    }
}

// Load the configuration file, writing a default one when it is missing
fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        return Config::load(config_path);
    }

    warn!("Config file not found at '{}', creating default config.", config_path);
    let config = Config::default();
    config.save(config_path)?;
    Ok(config)
}

async fn run_pipeline(mut config: Config, args: RunArgs) -> Result<()> {
    // Override config with CLI options if provided
    if let Some(variant) = args.variant {
        config.pipeline.variant = variant.into();
    }
    if args.drop_duplicates {
        config.pipeline.drop_duplicates = true;
    }
    if let Some(concurrency) = args.concurrency {
        config.pipeline.concurrency = concurrency;
    }
    if let Some(task_id) = args.task_id {
        config.task_id = Some(task_id);
    }

    config.validate().context("Configuration validation failed")?;
    let task_id = config.ensure_task_id();
    info!("Task id: {}", task_id);

    let text = if args.input.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("Failed to read records from stdin")?
    } else {
        std::fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read records from {:?}", args.input))?
    };
    let records = config_spider::Record::from_json_lines(&text)?;
    debug!("Loaded {} record(s)", records.len());

    let (store, translator): (Arc<dyn RecordStore>, Arc<dyn Translator>) = if args.dry_run {
        info!("Dry run: records stay in memory, translations are echoed");
        (Arc::new(MemoryStore::new()), Arc::new(MockTranslator::echo()))
    } else {
        (
            database::open_store(&config.store).await?,
            Arc::new(BaiduTranslator::from_config(&config.translation)),
        )
    };

    let pipeline = pipeline::from_config(&config, &task_id, store, translator);
    let runner = pipeline::PipelineRunner::new(pipeline, config.pipeline.concurrency);
    let summary = runner.run(stream::iter(records)).await?;

    if summary.stats.errors > 0 {
        return Err(anyhow!(
            "{} of {} record(s) failed, see the log above",
            summary.stats.errors,
            summary.received
        ));
    }

    info!(
        "Finished in {:.1}s: {}",
        summary.elapsed.as_secs_f64(),
        summary.stats
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
