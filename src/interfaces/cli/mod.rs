/// CLI Interface Module
///
/// Command-line front-end: replays a JSON-lines event log into a single
/// instrument book and prints the resulting snapshot.
///
/// ## Responsibilities
/// - Parse command-line arguments
/// - Initialise logging
/// - Build the book configuration and service
/// - Replay the input and render the snapshot (table or JSON)

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Parser;

use crate::application::services::BookService;
use crate::application::use_cases::{ReplayError, ReplayEventsUseCase};
use crate::domain::validation::{EventValidator, ValidationConfig};
use crate::shared::config::{BookConfig, DEFAULT_ANCHOR_OFFSET, DEFAULT_LOW_WATER_MARK};
use crate::shared::error::ConfigError;
use crate::shared::metrics::METRICS;

/// 订单簿构建器命令行配置
#[derive(Parser, Debug, Clone)]
#[command(name = "book-builder")]
#[command(version = "0.1.0")]
#[command(about = "Aggregated price-level order book builder", long_about = None)]
pub struct CliConfig {
    /// Event log, one JSON event per line ("-" reads stdin)
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// Instrument symbol
    #[arg(short, long, default_value = "UNKNOWN")]
    pub symbol: String,

    /// Minimum price increment
    #[arg(short = 't', long, default_value_t = 0.01)]
    pub tick_size: f64,

    /// Levels on each side of the anchor in the level window
    #[arg(short = 'a', long, default_value_t = DEFAULT_ANCHOR_OFFSET)]
    pub anchor_offset: usize,

    /// Best-level index below which the window is recentred
    #[arg(short = 'w', long, default_value_t = DEFAULT_LOW_WATER_MARK)]
    pub low_water_mark: usize,

    /// Snapshot depth per side
    #[arg(short = 'n', long, default_value_t = 10)]
    pub levels: usize,

    /// Largest accepted order size
    #[arg(long, default_value_t = i32::MAX)]
    pub max_order_size: i32,

    /// 日志级别
    #[arg(short = 'l', long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    pub log_level: String,

    /// Print the snapshot as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Print Prometheus metrics after the snapshot
    #[arg(long, default_value_t = false)]
    pub metrics: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error("failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to export metrics: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl CliConfig {
    pub fn book_config(&self) -> Result<BookConfig, ConfigError> {
        BookConfig::new(self.symbol.clone(), self.tick_size)?
            .with_window(self.anchor_offset, self.low_water_mark)
    }

    pub fn validation_config(&self) -> ValidationConfig {
        ValidationConfig {
            max_order_size: self.max_order_size,
        }
    }
}

/// Runs the CLI application
pub fn run() -> Result<(), CliError> {
    let config = CliConfig::parse();
    init_logging(&config.log_level);

    tracing::info!("book builder starting");
    tracing::info!("配置: {:?}", config);

    let book_config = config.book_config()?;
    let mut service = BookService::with_validator(
        &book_config,
        EventValidator::with_config(config.validation_config()),
    );

    let summary = if config.input.as_os_str() == "-" {
        ReplayEventsUseCase::new(&mut service).execute(io::stdin().lock())?
    } else {
        let file = File::open(&config.input).map_err(|source| CliError::Open {
            path: config.input.clone(),
            source,
        })?;
        ReplayEventsUseCase::new(&mut service).execute(BufReader::new(file))?
    };
    tracing::info!(
        events = summary.events,
        applied = summary.applied,
        rejected = summary.rejected,
        "replay finished"
    );

    let snapshot = service.snapshot(config.levels);
    if config.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", snapshot);
    }

    if config.metrics {
        print!("{}", METRICS.export()?);
    }
    Ok(())
}

/// 初始化日志系统
fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
