//! Batch lookup sessions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::app::{log_progress, shutdown_gracefully};
use crate::config::{Config, LOGGING_INTERVAL};
use crate::domain::DomainSet;
use crate::error_handling::{FailureStats, InitializationError};
use crate::initialization::init_client;
use crate::rate_limiter::ChannelRateLimiter;
use crate::storage::{BlobStore, FileBlobStore, HistoryStore};
use crate::whois::{ChannelQuery, NetworkChannels, ResultCache, SourceMode};

use super::resources::{BatchReport, ProgressCallback, ResultTable};
use super::task::{process_domain, WorkerContext};

/// A long-lived lookup session.
///
/// The session owns the channel implementation, the per-channel rate
/// limiter, the result cache and the history log, so all of them outlive any
/// single batch. Each call to [`LookupSession::run_batch`] resets the result
/// table and drains the given domains with `config.workers` workers.
///
/// # Example
///
/// ```no_run
/// use whois_batch::{Config, LookupSession, SourceMode};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let session = LookupSession::from_config(Config::default())?;
/// let report = session
///     .run_text("example.com, openai.com", &SourceMode::Auto)
///     .await;
/// println!("{} of {} succeeded", report.stats.success, report.stats.total);
/// # Ok(())
/// # }
/// ```
pub struct LookupSession {
    config: Config,
    channels: Arc<dyn ChannelQuery>,
    limiter: Arc<ChannelRateLimiter>,
    cache: Arc<ResultCache>,
    history: Arc<HistoryStore>,
    table: Arc<ResultTable>,
    progress_callback: ProgressCallback,
}

impl LookupSession {
    /// Creates a session over an explicit channel implementation and blob store.
    ///
    /// The cache and history are loaded from `store` immediately.
    pub fn new(config: Config, channels: Arc<dyn ChannelQuery>, store: Arc<dyn BlobStore>) -> Self {
        let limiter = Arc::new(build_limiter(&config));
        Self::with_limiter(config, channels, store, limiter)
    }

    fn with_limiter(
        config: Config,
        channels: Arc<dyn ChannelQuery>,
        store: Arc<dyn BlobStore>,
        limiter: Arc<ChannelRateLimiter>,
    ) -> Self {
        let cache = Arc::new(ResultCache::load(Arc::clone(&store)));
        let history = Arc::new(HistoryStore::load(store));
        LookupSession {
            config,
            channels,
            limiter,
            cache,
            history,
            table: Arc::new(ResultTable::new()),
            progress_callback: None,
        }
    }

    /// Creates a session with the network channels and a file store in `config.data_dir`.
    ///
    /// The channels share the session's rate limiter, so registry servers
    /// reached through a referral are spaced like any other channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: Config) -> Result<Self, InitializationError> {
        let client = init_client(&config)?;
        let limiter = Arc::new(build_limiter(&config));
        let channels: Arc<dyn ChannelQuery> = Arc::new(
            NetworkChannels::new(client, &config).with_rate_limiter(Arc::clone(&limiter)),
        );
        let store: Arc<dyn BlobStore> = Arc::new(FileBlobStore::new(&config.data_dir));
        Ok(Self::with_limiter(config, channels, store, limiter))
    }

    /// The per-channel limiter shared by this session's workers.
    pub fn rate_limiter(&self) -> Arc<ChannelRateLimiter> {
        Arc::clone(&self.limiter)
    }

    /// Registers a callback invoked with every result the workers publish.
    pub fn with_progress_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&crate::whois::DomainResult) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The live result table of the current (or last) batch.
    pub fn table(&self) -> Arc<ResultTable> {
        Arc::clone(&self.table)
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Parses `text` into a domain set and runs it.
    pub async fn run_text(&self, text: &str, mode: &SourceMode) -> BatchReport {
        let domains = DomainSet::parse(text);
        self.run_batch(&domains, mode).await
    }

    /// Looks up every domain in `domains` and waits for all of them.
    ///
    /// Per-domain failures never abort the batch; they end up in the
    /// corresponding result's `error`.
    pub async fn run_batch(&self, domains: &DomainSet, mode: &SourceMode) -> BatchReport {
        let start_time = Instant::now();
        let batch_size = domains.len();
        let failure_stats = Arc::new(FailureStats::new());
        self.table.reset(batch_size);

        info!(
            "Looking up {} domain{} via {} with {} worker{}",
            batch_size,
            if batch_size == 1 { "" } else { "s" },
            mode,
            self.config.workers,
            if self.config.workers == 1 { "" } else { "s" }
        );

        let ctx = Arc::new(WorkerContext {
            channels: Arc::clone(&self.channels),
            limiter: Arc::clone(&self.limiter),
            cache: self.config.use_cache.then(|| Arc::clone(&self.cache)),
            history: Arc::clone(&self.history),
            table: Arc::clone(&self.table),
            failure_stats: Arc::clone(&failure_stats),
            progress_callback: self.progress_callback.clone(),
            mode: mode.clone(),
        });
        let queue: Arc<[String]> = domains.as_slice().into();
        let cursor = Arc::new(AtomicUsize::new(0));

        let cancel = CancellationToken::new();
        let logging_task = spawn_progress_logger(
            cancel.clone(),
            Arc::clone(&self.table),
            start_time,
            batch_size,
        );

        let mut workers = FuturesUnordered::new();
        for _ in 0..self.config.workers.max(1) {
            let ctx = Arc::clone(&ctx);
            let queue = Arc::clone(&queue);
            let cursor = Arc::clone(&cursor);
            workers.push(tokio::spawn(async move {
                loop {
                    let index = cursor.fetch_add(1, Ordering::SeqCst);
                    let Some(domain) = queue.get(index) else {
                        break;
                    };
                    process_domain(&ctx, domain).await;
                }
            }));
        }
        while let Some(joined) = workers.next().await {
            if let Err(e) = joined {
                warn!("Lookup worker ended abnormally: {}", e);
            }
        }

        shutdown_gracefully(cancel, Some(logging_task)).await;

        let results = self.table.snapshot();
        let stats = self.table.stats();
        log_progress(start_time, batch_size, &stats);

        BatchReport {
            mode: mode.clone(),
            results,
            stats,
            failure_stats,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        }
    }
}

fn build_limiter(config: &Config) -> ChannelRateLimiter {
    ChannelRateLimiter::new(config.min_interval, config.channel_intervals.clone())
}

fn spawn_progress_logger(
    cancel: CancellationToken,
    table: Arc<ResultTable>,
    start_time: Instant,
    batch_size: usize,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(LOGGING_INTERVAL));
        // The first tick fires immediately
        ticker.tick().await;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    log_progress(start_time, batch_size, &table.stats());
                }
            }
        }
    })
}
