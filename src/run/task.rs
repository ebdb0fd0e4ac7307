//! Per-domain lookup processing.

use std::sync::Arc;

use chrono::Utc;

use crate::aggregate::finalize;
use crate::error_handling::FailureStats;
use crate::rate_limiter::ChannelRateLimiter;
use crate::storage::HistoryStore;
use crate::whois::{ChannelQuery, DomainResult, ResultCache, SourceMode};

use super::resources::{ProgressCallback, ResultTable};

/// Everything a worker needs, shared across the pool.
pub(crate) struct WorkerContext {
    pub(crate) channels: Arc<dyn ChannelQuery>,
    pub(crate) limiter: Arc<ChannelRateLimiter>,
    pub(crate) cache: Option<Arc<ResultCache>>,
    pub(crate) history: Arc<HistoryStore>,
    pub(crate) table: Arc<ResultTable>,
    pub(crate) failure_stats: Arc<FailureStats>,
    pub(crate) progress_callback: ProgressCallback,
    pub(crate) mode: SourceMode,
}

impl WorkerContext {
    fn publish(&self, result: &DomainResult) {
        self.table.publish(result.clone());
        if let Some(callback) = &self.progress_callback {
            callback(result);
        }
    }

    fn serve_from_cache(&self, domain: &str) -> Option<DomainResult> {
        let cached = self.cache.as_ref()?.get(domain, &self.mode)?;
        Some(cached)
    }
}

/// Looks up one claimed domain and publishes its result.
///
/// The steps are:
/// 1. Publish an in-flight result
/// 2. On a fresh cache hit, publish the cached record and stop
/// 3. Otherwise query the mode's channels through the rate limiter
/// 4. Aggregate, stamp `finished_at` and publish
/// 5. On success, write the cache and append to history
pub(crate) async fn process_domain(ctx: &WorkerContext, domain: &str) {
    let started_at = Utc::now();
    let mut result = DomainResult::in_flight(domain, started_at);
    ctx.publish(&result);

    if let Some(cached) = ctx.serve_from_cache(domain) {
        let served = DomainResult {
            domain: domain.to_string(),
            started_at,
            finished_at: Some(Utc::now().max(started_at)),
            from_cache: true,
            ..cached
        };
        ctx.publish(&served);
        return;
    }

    let mut errors = Vec::new();
    for channel in ctx.mode.channels_for(domain) {
        ctx.limiter.wait(channel.name()).await;
        match ctx.channels.query(domain, &channel).await {
            Ok(record) => {
                log::debug!("{} answered for {}", channel, domain);
                result.channels.push(record);
                ctx.publish(&result);
                if ctx.mode.short_circuits() {
                    break;
                }
            }
            Err(e) => {
                log::debug!("Channel failure for {}: {}", domain, e);
                ctx.failure_stats.record(&e);
                errors.push(e);
            }
        }
    }

    finalize(&mut result, &errors, Utc::now());
    ctx.publish(&result);

    if result.is_success() {
        if let Some(cache) = &ctx.cache {
            cache.put(domain, &ctx.mode, &result);
        }
        ctx.history.append(&ctx.mode.key(), &result);
    } else {
        log::warn!(
            "Lookup failed for {}: {}",
            domain,
            result.error.as_deref().unwrap_or_default()
        );
    }
}
