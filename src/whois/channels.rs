//! Channel queries: RDAP over HTTPS and WHOIS over TCP port 43.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::parse::{parse_iana_referral, parse_rdap_json, parse_whois_text};
use super::types::{Channel, ParsedRecord};
use crate::config::{
    Config, IANA_WHOIS_SERVER, MAX_WHOIS_RESPONSE_SIZE, VERISIGN_WHOIS_SERVER,
    WHOIS_FALLBACK_SERVERS, WHOIS_PORT,
};
use crate::domain::extract_tld;
use crate::error_handling::{
    categorize_io_error, categorize_reqwest_error, FailureKind, LookupError,
};
use crate::rate_limiter::ChannelRateLimiter;

const RDAP_CONTENT_TYPE: &str = "application/rdap+json";

/// Queries one channel for one domain.
///
/// This is the seam between the batch orchestrator and the network. The
/// orchestrator never talks to a lookup service directly; tests substitute a
/// scripted implementation.
#[async_trait]
pub trait ChannelQuery: Send + Sync {
    async fn query(&self, domain: &str, channel: &Channel) -> Result<ParsedRecord, LookupError>;
}

/// Default [`ChannelQuery`] backed by reqwest (RDAP) and tokio sockets (WHOIS).
pub struct NetworkChannels {
    client: Arc<reqwest::Client>,
    rdap_org_base_url: String,
    verisign_base_url: String,
    whois_timeout: Duration,
    whois_port: u16,
    iana_server: String,
    whois_fallbacks: Vec<String>,
    limiter: Option<Arc<ChannelRateLimiter>>,
}

impl NetworkChannels {
    /// Builds the channels from a shared HTTP client and the lookup config.
    pub fn new(client: Arc<reqwest::Client>, config: &Config) -> Self {
        NetworkChannels {
            client,
            rdap_org_base_url: config.rdap_org_base_url.trim_end_matches('/').to_string(),
            verisign_base_url: config.verisign_base_url.trim_end_matches('/').to_string(),
            whois_timeout: config.whois_timeout,
            whois_port: WHOIS_PORT,
            iana_server: IANA_WHOIS_SERVER.to_string(),
            whois_fallbacks: WHOIS_FALLBACK_SERVERS.iter().map(|s| s.to_string()).collect(),
            limiter: None,
        }
    }

    /// Overrides the WHOIS TCP port (43 by default).
    pub fn with_whois_port(mut self, port: u16) -> Self {
        self.whois_port = port;
        self
    }

    /// Overrides the server asked for TLD referrals.
    pub fn with_iana_server(mut self, server: impl Into<String>) -> Self {
        self.iana_server = server.into();
        self
    }

    /// Replaces the registry servers tried after the referred WHOIS server.
    pub fn with_whois_fallbacks<I, S>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.whois_fallbacks = servers.into_iter().map(Into::into).collect();
        self
    }

    /// Spaces registry-server requests of the referral channel with `limiter`.
    ///
    /// The referral request itself is spaced by the caller under the
    /// `whois-referral` key. Each registry server gets its own slot keyed by
    /// its name.
    pub fn with_rate_limiter(mut self, limiter: Arc<ChannelRateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    async fn rdap_query(
        &self,
        domain: &str,
        channel: &Channel,
        url: &str,
    ) -> Result<ParsedRecord, LookupError> {
        let name = channel.name();
        log::debug!("RDAP query for {} via {}: {}", domain, name, url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, RDAP_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| LookupError::channel(name, categorize_reqwest_error(&e), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::channel(
                name,
                FailureKind::HttpStatus,
                format!("unexpected status {status}"),
            ));
        }

        let value: Value = response.json().await.map_err(|e| {
            LookupError::channel(
                name,
                categorize_reqwest_error(&e),
                format!("failed to decode RDAP response: {e}"),
            )
        })?;
        Ok(parse_rdap_json(domain, name, &value))
    }

    async fn verisign_query(
        &self,
        domain: &str,
        channel: &Channel,
    ) -> Result<ParsedRecord, LookupError> {
        let tld = match extract_tld(domain) {
            Some(tld @ ("com" | "net")) => tld,
            _ => {
                return Err(LookupError::channel(
                    channel.name(),
                    FailureKind::Unsupported,
                    "only .com and .net are served",
                ))
            }
        };
        let url = format!("{}/{}/v1/domain/{}", self.verisign_base_url, tld, domain);
        self.rdap_query(domain, channel, &url).await
    }

    /// Sends `query` to `server` on the WHOIS port and returns the decoded text.
    ///
    /// `server` may carry a `:port` suffix. The whole exchange (connect,
    /// write, read to EOF) shares one timeout. Responses longer than
    /// [`MAX_WHOIS_RESPONSE_SIZE`] are truncated.
    async fn whois_exchange(&self, server: &str, query: &str) -> Result<String, std::io::Error> {
        let (host, port) = split_host_port(server, self.whois_port);
        let exchange = async {
            let mut stream = TcpStream::connect((host, port)).await?;
            stream.write_all(format!("{query}\r\n").as_bytes()).await?;
            let mut buf = Vec::new();
            (&mut stream)
                .take(MAX_WHOIS_RESPONSE_SIZE as u64)
                .read_to_end(&mut buf)
                .await?;
            Ok::<_, std::io::Error>(buf)
        };

        let buf = tokio::time::timeout(self.whois_timeout, exchange)
            .await
            .map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("no answer from {server} within {:?}", self.whois_timeout),
                )
            })??;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    async fn whois_query(
        &self,
        domain: &str,
        channel: &Channel,
        server: &str,
    ) -> Result<ParsedRecord, LookupError> {
        log::debug!("WHOIS query for {} via {}", domain, server);
        let text = self.whois_exchange(server, domain).await.map_err(|e| {
            LookupError::channel(channel.name(), categorize_io_error(&e), format!("{server}: {e}"))
        })?;
        if text.trim().is_empty() {
            return Err(LookupError::channel(
                channel.name(),
                FailureKind::Decode,
                format!("{server}: empty response"),
            ));
        }
        Ok(parse_whois_text(domain, server, &text))
    }

    /// Finds the WHOIS server for `tld`, asking IANA first.
    async fn resolve_whois_server(&self, tld: &str) -> String {
        match self.whois_exchange(&self.iana_server, tld).await {
            Ok(text) => {
                if let Some(server) = parse_iana_referral(&text) {
                    return server;
                }
                log::debug!("No referral for .{} from {}", tld, self.iana_server);
            }
            Err(e) => log::debug!("IANA referral for .{} failed: {}", tld, e),
        }
        fallback_whois_server(tld)
    }

    /// Queries the referred server, then each registry fallback in order.
    ///
    /// Returns the first answer, or the last failure if no server answered.
    async fn referral_query(
        &self,
        domain: &str,
        channel: &Channel,
    ) -> Result<ParsedRecord, LookupError> {
        let tld = extract_tld(domain).ok_or_else(|| {
            LookupError::Validation(format!("{domain} has no top-level label"))
        })?;
        let referred = self.resolve_whois_server(tld).await;

        let mut servers = vec![referred];
        for server in &self.whois_fallbacks {
            if !servers.contains(server) {
                servers.push(server.clone());
            }
        }

        let mut last_error = None;
        for server in &servers {
            if let Some(limiter) = &self.limiter {
                limiter.wait(server).await;
            }
            match self.whois_query(domain, channel, server).await {
                Ok(record) => return Ok(record),
                Err(e) => {
                    log::debug!("WHOIS server {} failed for {}: {}", server, domain, e);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| {
            LookupError::channel(channel.name(), FailureKind::Other, "no WHOIS server to ask")
        }))
    }
}

/// Splits an optional `:port` suffix off a server name.
///
/// Anything that is not `host:u16` (including bare IPv6 addresses) is taken
/// as a host on `default_port`.
fn split_host_port(server: &str, default_port: u16) -> (&str, u16) {
    match server.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && !host.contains(':') => match port.parse() {
            Ok(port) => (host, port),
            Err(_) => (server, default_port),
        },
        _ => (server, default_port),
    }
}

/// WHOIS server used when IANA gives no referral.
pub(crate) fn fallback_whois_server(tld: &str) -> String {
    match tld {
        "com" | "net" => VERISIGN_WHOIS_SERVER.to_string(),
        _ => format!("{tld}.whois-servers.net"),
    }
}

#[async_trait]
impl ChannelQuery for NetworkChannels {
    async fn query(&self, domain: &str, channel: &Channel) -> Result<ParsedRecord, LookupError> {
        match channel {
            Channel::RdapOrg => {
                let url = format!("{}/domain/{}", self.rdap_org_base_url, domain);
                self.rdap_query(domain, channel, &url).await
            }
            Channel::VerisignRdap => self.verisign_query(domain, channel).await,
            Channel::IanaWhois => self.referral_query(domain, channel).await,
            Channel::Server(host) => self.whois_query(domain, channel, host).await,
        }
    }
}
