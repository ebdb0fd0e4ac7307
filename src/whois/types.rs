//! WHOIS/RDAP data structures.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::extract_tld;
use crate::error_handling::LookupError;

/// Source identifiers of registry-grade (RDAP) channels.
///
/// Records from these sources carry structured JSON data and are preferred
/// over free-text WHOIS answers.
pub const STRUCTURED_SOURCES: &[&str] = &["rdap.org", "rdap.verisign.com"];

/// One external lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// rdap.org bootstrap redirector
    RdapOrg,
    /// Verisign's RDAP service (.com/.net only)
    VerisignRdap,
    /// Port-43 WHOIS via the IANA referral for the domain's TLD
    IanaWhois,
    /// Port-43 WHOIS against an explicitly named server
    Server(String),
}

impl Channel {
    /// Stable channel name, used for rate limiting and error messages.
    pub fn name(&self) -> &str {
        match self {
            Channel::RdapOrg => "rdap.org",
            Channel::VerisignRdap => "rdap.verisign.com",
            Channel::IanaWhois => "whois-referral",
            Channel::Server(host) => host,
        }
    }

    /// Whether this channel can answer for `domain` at all.
    ///
    /// Channels that cannot are skipped in `Auto`/`All` mode instead of being
    /// recorded as failures.
    pub fn supports(&self, domain: &str) -> bool {
        match self {
            Channel::VerisignRdap => matches!(extract_tld(domain), Some("com") | Some("net")),
            _ => true,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which channel(s) a batch run queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SourceMode {
    /// Try [`SourceMode::AUTO_ORDER`] in turn, stopping at the first record
    #[default]
    Auto,
    /// Query every channel and keep all records
    All,
    /// rdap.org only
    RdapOrg,
    /// Verisign RDAP only
    VerisignRdap,
    /// WHOIS via IANA referral only
    IanaWhois,
    /// WHOIS against a caller-named server
    Server(String),
}

impl SourceMode {
    /// Channel preference order for `Auto` (and query order for `All`).
    pub const AUTO_ORDER: [Channel; 3] =
        [Channel::RdapOrg, Channel::VerisignRdap, Channel::IanaWhois];

    /// Channels to query for `domain`, in order.
    pub fn channels_for(&self, domain: &str) -> Vec<Channel> {
        match self {
            SourceMode::Auto | SourceMode::All => Self::AUTO_ORDER
                .iter()
                .filter(|channel| channel.supports(domain))
                .cloned()
                .collect(),
            SourceMode::RdapOrg => vec![Channel::RdapOrg],
            SourceMode::VerisignRdap => vec![Channel::VerisignRdap],
            SourceMode::IanaWhois => vec![Channel::IanaWhois],
            SourceMode::Server(host) => vec![Channel::Server(host.clone())],
        }
    }

    /// Whether the first record found ends the lookup for a domain.
    pub fn short_circuits(&self) -> bool {
        !matches!(self, SourceMode::All)
    }

    /// Stable key used in cache entries and on the command line.
    pub fn key(&self) -> String {
        match self {
            SourceMode::Auto => "auto".to_string(),
            SourceMode::All => "all".to_string(),
            SourceMode::RdapOrg => Channel::RdapOrg.name().to_string(),
            SourceMode::VerisignRdap => Channel::VerisignRdap.name().to_string(),
            SourceMode::IanaWhois => Channel::IanaWhois.name().to_string(),
            SourceMode::Server(host) => format!("server:{host}"),
        }
    }
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for SourceMode {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(host) = trimmed.strip_prefix("server:") {
            let host = host.trim().to_ascii_lowercase();
            if host.is_empty() {
                return Err(LookupError::InvalidSource(
                    "WHOIS server name must not be empty".to_string(),
                ));
            }
            return Ok(SourceMode::Server(host));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "auto" => Ok(SourceMode::Auto),
            "all" => Ok(SourceMode::All),
            "rdap.org" | "rdap" => Ok(SourceMode::RdapOrg),
            "rdap.verisign.com" | "verisign" => Ok(SourceMode::VerisignRdap),
            "whois-referral" | "whois" => Ok(SourceMode::IanaWhois),
            other => Err(LookupError::InvalidSource(format!("unknown mode '{other}'"))),
        }
    }
}

/// The result of one successful channel query for one domain.
///
/// Every optional field distinguishes "absent" (`None`) from "empty".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecord {
    /// Domain the record describes
    pub domain: String,
    /// Channel or server that produced the record
    pub source: String,
    /// Registrar name
    pub registrar: Option<String>,
    /// Registrant name or organization
    pub registrant: Option<String>,
    /// Registration date, as reported
    pub created: Option<String>,
    /// Expiry date, as reported
    pub expires: Option<String>,
    /// Last update date, as reported
    pub updated: Option<String>,
    /// Domain status codes (e.g. "clientTransferProhibited")
    pub status: Option<Vec<String>>,
    /// Delegated name servers
    pub name_servers: Option<Vec<String>>,
    /// Raw response text (WHOIS text or RDAP JSON)
    pub raw_text: Option<String>,
}

impl ParsedRecord {
    /// Empty record for `domain` from `source`.
    pub fn new(domain: impl Into<String>, source: impl Into<String>) -> Self {
        ParsedRecord {
            domain: domain.into(),
            source: source.into(),
            ..Default::default()
        }
    }

    /// True if the record came from a registry-grade (RDAP) source.
    pub fn is_structured(&self) -> bool {
        STRUCTURED_SOURCES.contains(&self.source.as_str())
    }
}

/// Aggregated outcome for one domain in a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainResult {
    /// Normalized domain name
    pub domain: String,
    /// Records gathered so far, in arrival order
    pub channels: Vec<ParsedRecord>,
    /// Authoritative record chosen by the aggregator
    pub best: Option<ParsedRecord>,
    /// Joined failure messages when no record was found
    pub error: Option<String>,
    /// When processing of this domain started
    pub started_at: DateTime<Utc>,
    /// When processing finished; `None` while in flight
    pub finished_at: Option<DateTime<Utc>>,
    /// Whether the result was served from the cache
    #[serde(default)]
    pub from_cache: bool,
}

impl DomainResult {
    /// A freshly claimed, in-flight result.
    pub fn in_flight(domain: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        DomainResult {
            domain: domain.into(),
            channels: Vec::new(),
            best: None,
            error: None,
            started_at,
            finished_at: None,
            from_cache: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    pub fn is_success(&self) -> bool {
        self.best.is_some()
    }

    /// Wall-clock processing time in milliseconds, once finished.
    pub fn latency_ms(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_milliseconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_mode_round_trips_through_key() {
        for mode in [
            SourceMode::Auto,
            SourceMode::All,
            SourceMode::RdapOrg,
            SourceMode::VerisignRdap,
            SourceMode::IanaWhois,
            SourceMode::Server("whois.nic.io".to_string()),
        ] {
            assert_eq!(mode.key().parse::<SourceMode>(), Ok(mode.clone()));
        }
    }

    #[test]
    fn test_source_mode_aliases() {
        assert_eq!("AUTO".parse::<SourceMode>(), Ok(SourceMode::Auto));
        assert_eq!("whois".parse::<SourceMode>(), Ok(SourceMode::IanaWhois));
        assert_eq!("verisign".parse::<SourceMode>(), Ok(SourceMode::VerisignRdap));
        assert!("server:".parse::<SourceMode>().is_err());
        assert!("gopher".parse::<SourceMode>().is_err());
    }

    #[test]
    fn test_source_mode_errors_name_the_mode() {
        let err = "gopher".parse::<SourceMode>().expect_err("unknown mode");
        assert_eq!(err.to_string(), "invalid source mode: unknown mode 'gopher'");
        assert!(!err.to_string().contains("domain"));

        let err = "server:  ".parse::<SourceMode>().expect_err("empty server");
        assert_eq!(
            err.to_string(),
            "invalid source mode: WHOIS server name must not be empty"
        );
    }

    #[test]
    fn test_auto_channels_skip_unsupported() {
        assert_eq!(
            SourceMode::Auto.channels_for("example.com"),
            vec![Channel::RdapOrg, Channel::VerisignRdap, Channel::IanaWhois]
        );
        assert_eq!(
            SourceMode::Auto.channels_for("example.org"),
            vec![Channel::RdapOrg, Channel::IanaWhois]
        );
    }

    #[test]
    fn test_named_mode_queries_exactly_one_channel() {
        // An explicitly chosen channel is queried even if it cannot serve the TLD
        assert_eq!(
            SourceMode::VerisignRdap.channels_for("example.org"),
            vec![Channel::VerisignRdap]
        );
        assert_eq!(
            SourceMode::Server("whois.nic.io".into()).channels_for("x.io"),
            vec![Channel::Server("whois.nic.io".into())]
        );
    }

    #[test]
    fn test_short_circuit_policy() {
        assert!(SourceMode::Auto.short_circuits());
        assert!(!SourceMode::All.short_circuits());
    }

    #[test]
    fn test_structured_sources() {
        assert!(ParsedRecord::new("a.com", "rdap.org").is_structured());
        assert!(ParsedRecord::new("a.com", "rdap.verisign.com").is_structured());
        assert!(!ParsedRecord::new("a.com", "whois.verisign-grs.com").is_structured());
    }

    #[test]
    fn test_domain_result_latency() {
        let start = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
        let mut result = DomainResult::in_flight("example.com", start);
        assert!(!result.is_finished());
        assert_eq!(result.latency_ms(), None);

        result.finished_at = Some(start + chrono::Duration::milliseconds(1500));
        assert!(result.is_finished());
        assert_eq!(result.latency_ms(), Some(1500));
    }
}
