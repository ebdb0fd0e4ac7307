//! whois_batch library: batch WHOIS/RDAP domain lookups
//!
//! This library looks up registration data for many domains at once. It
//! queries RDAP and WHOIS channels through a bounded worker pool, spaces
//! requests per channel, caches successful results for 24 hours and keeps a
//! capped history of successful lookups.
//!
//! # Example
//!
//! ```no_run
//! use whois_batch::{Config, LookupSession, SourceMode};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     workers: 4,
//!     ..Default::default()
//! };
//!
//! let session = LookupSession::from_config(config)?;
//! let report = session
//!     .run_text("EXAMPLE.com, example.com\nopenai.com", &SourceMode::Auto)
//!     .await;
//! println!(
//!     "Looked up {} domains: {} succeeded, {} failed",
//!     report.stats.total, report.stats.success, report.stats.failed
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod aggregate;
pub mod app;
pub mod config;
pub mod domain;
pub mod error_handling;
pub mod export;
pub mod initialization;
pub mod rate_limiter;
mod run;
pub mod storage;
pub mod whois;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use domain::DomainSet;
pub use error_handling::{FailureKind, FailureStats, InitializationError, LookupError};
pub use run::{BatchReport, LookupSession, ProgressCallback, ResultTable};
pub use storage::{BlobStore, FileBlobStore, HistoryEntry, HistoryStore, MemoryBlobStore};
pub use whois::{Channel, ChannelQuery, DomainResult, ParsedRecord, SourceMode};
