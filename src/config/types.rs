//! Configuration types and CLI options.
//!
//! This module defines the library `Config`, the `clap` command-line options,
//! and the enums shared between them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_DATA_DIR, DEFAULT_MIN_INTERVAL, DEFAULT_WORKERS, RDAP_ORG_BASE_URL, RDAP_TIMEOUT_SECS,
    VERISIGN_RDAP_BASE_URL, WHOIS_TIMEOUT_SECS,
};
use crate::export::ExportFormat;
use crate::whois::SourceMode;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use whois_batch::Config;
///
/// let config = Config {
///     workers: 2,
///     ..Default::default()
/// };
/// assert_eq!(config.workers, 2);
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Number of concurrent lookup workers
    pub workers: usize,

    /// Minimum spacing between requests to one channel, unless overridden below
    pub min_interval: Duration,

    /// Per-channel overrides of `min_interval`, keyed by channel name
    pub channel_intervals: HashMap<String, Duration>,

    /// Directory holding the persisted cache and history blobs
    pub data_dir: PathBuf,

    /// Serve and store cached results
    pub use_cache: bool,

    /// RDAP request timeout
    pub rdap_timeout: Duration,

    /// WHOIS connect/read timeout
    pub whois_timeout: Duration,

    /// Base URL of the rdap.org bootstrap service
    pub rdap_org_base_url: String,

    /// Base URL of the Verisign RDAP service
    pub verisign_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            min_interval: DEFAULT_MIN_INTERVAL,
            channel_intervals: HashMap::new(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            use_cache: true,
            rdap_timeout: Duration::from_secs(RDAP_TIMEOUT_SECS),
            whois_timeout: Duration::from_secs(WHOIS_TIMEOUT_SECS),
            rdap_org_base_url: RDAP_ORG_BASE_URL.to_string(),
            verisign_base_url: VERISIGN_RDAP_BASE_URL.to_string(),
        }
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Look up every domain in a file using the automatic channel order
/// whois_batch domains.txt
///
/// # Query only rdap.org with two workers and export CSV
/// whois_batch domains.txt --source rdap.org --workers 2 --export csv --output out.csv
///
/// # Read from stdin and ask a specific WHOIS server
/// echo "example.com" | whois_batch - --source server:whois.verisign-grs.com
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "whois_batch",
    about = "Looks up WHOIS/RDAP registration data for a list of domains."
)]
pub struct Opt {
    /// File with domains (whitespace, comma or semicolon separated), or '-' for stdin
    #[arg(value_parser, default_value = "-")]
    pub file: PathBuf,

    /// Lookup source: auto|all|rdap.org|rdap.verisign.com|whois-referral|server:<host>
    #[arg(long, default_value = "auto")]
    pub source: SourceMode,

    /// Number of concurrent lookup workers
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Minimum milliseconds between two requests to the same channel
    #[arg(long, default_value_t = DEFAULT_MIN_INTERVAL.as_millis() as u64)]
    pub min_interval_ms: u64,

    /// Directory for the persisted cache and history
    #[arg(long, value_parser, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Skip the result cache for this run (neither read nor written)
    #[arg(long)]
    pub no_cache: bool,

    /// Export results after the run: csv|json
    #[arg(long, value_enum)]
    pub export: Option<ExportFormat>,

    /// Export destination (stdout if omitted)
    #[arg(long, value_parser)]
    pub output: Option<PathBuf>,

    /// Print the persisted lookup history as JSON and exit
    #[arg(long)]
    pub show_history: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl From<&Opt> for Config {
    fn from(opt: &Opt) -> Self {
        Config {
            workers: opt.workers.max(1),
            min_interval: Duration::from_millis(opt.min_interval_ms),
            data_dir: opt.data_dir.clone(),
            use_cache: !opt.no_cache,
            ..Default::default()
        }
    }
}
