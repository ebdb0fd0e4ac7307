//! HTTP client initialization.

use std::sync::Arc;

use reqwest::ClientBuilder;

use crate::config::{Config, DEFAULT_USER_AGENT};

/// Initializes the HTTP client used by the RDAP channels.
///
/// The client carries the RDAP timeout from `config` and a crate-identifying
/// User-Agent. RDAP servers redirect between registries, so redirects are
/// followed with reqwest's default policy.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(config.rdap_timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .build()?;
    Ok(Arc::new(client))
}
