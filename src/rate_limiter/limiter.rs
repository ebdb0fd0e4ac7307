//! Per-channel minimum-interval limiter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;

/// Spaces out requests sent to the same channel.
///
/// Each channel has its own slot holding the instant `wait` last returned.
/// A caller locks the slot, sleeps until the interval has passed, stamps the
/// slot and releases it, so concurrent callers on one channel are served one
/// at a time. Channels never block each other.
pub struct ChannelRateLimiter {
    default_interval: Duration,
    overrides: HashMap<String, Duration>,
    slots: Mutex<HashMap<String, Arc<AsyncMutex<Option<Instant>>>>>,
}

impl ChannelRateLimiter {
    /// Creates a limiter with a default interval and per-channel overrides.
    pub fn new(default_interval: Duration, overrides: HashMap<String, Duration>) -> Self {
        ChannelRateLimiter {
            default_interval,
            overrides,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Minimum interval enforced for `channel`.
    pub fn interval_for(&self, channel: &str) -> Duration {
        self.overrides
            .get(channel)
            .copied()
            .unwrap_or(self.default_interval)
    }

    fn slot(&self, channel: &str) -> Arc<AsyncMutex<Option<Instant>>> {
        // The map lock is never held across an await
        let mut slots = match self.slots.lock() {
            Ok(slots) => slots,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(slots.entry(channel.to_string()).or_default())
    }

    /// Waits until a request to `channel` may be sent.
    ///
    /// Returns once at least `interval_for(channel)` has elapsed since the
    /// previous `wait` on the same channel returned. The first call for a
    /// channel returns immediately.
    pub async fn wait(&self, channel: &str) {
        let interval = self.interval_for(channel);
        let slot = self.slot(channel);
        let mut last = slot.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + interval;
            if ready_at > Instant::now() {
                log::trace!(
                    "Rate limiting {} for {:?}",
                    channel,
                    ready_at - Instant::now()
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last = Some(Instant::now());
    }
}
