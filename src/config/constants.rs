//! Configuration constants.
//!
//! Defaults for lookup timing, cache lifetime, history size and worker count.

use std::time::Duration;

/// Number of lookup workers draining the domain queue.
pub const DEFAULT_WORKERS: usize = 6;

/// Progress log interval in seconds while a batch is running.
pub const LOGGING_INTERVAL: u64 = 5;

/// Minimum spacing between two requests sent to the same channel.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(700);

/// Cached results older than this are not served (24 hours).
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Maximum number of successful results kept in the history log.
pub const HISTORY_MAX_ENTRIES: usize = 200;

/// Blob key used by the result cache.
pub const CACHE_BLOB_KEY: &str = "cache";

/// Blob key used by the history log.
pub const HISTORY_BLOB_KEY: &str = "history";

/// Default directory for persisted blobs.
pub const DEFAULT_DATA_DIR: &str = ".whois_batch";

// Network operation timeouts
/// RDAP HTTP request timeout in seconds
pub const RDAP_TIMEOUT_SECS: u64 = 3;
/// WHOIS (port 43) connect/read/write timeout in seconds
pub const WHOIS_TIMEOUT_SECS: u64 = 5;
/// TCP port for the WHOIS protocol
pub const WHOIS_PORT: u16 = 43;

/// Upper bound on a WHOIS response body. Servers that stream more than this are cut off.
pub const MAX_WHOIS_RESPONSE_SIZE: usize = 512 * 1024;

// Lookup endpoints
pub const RDAP_ORG_BASE_URL: &str = "https://rdap.org";
pub const VERISIGN_RDAP_BASE_URL: &str = "https://rdap.verisign.com";
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";
pub const VERISIGN_WHOIS_SERVER: &str = "whois.verisign-grs.com";

/// Registry WHOIS servers tried in order after the referred server fails.
pub const WHOIS_FALLBACK_SERVERS: &[&str] = &[
    "whois.verisign-grs.com",
    "grs-whois.cndns.com",
    "grs-whois.hichina.com",
];

/// Separator used when joining per-channel failure messages.
pub const ERROR_SEPARATOR: &str = "; ";

/// Separator for list fields (status, name servers) in CSV output.
pub const CSV_LIST_SEPARATOR: &str = "|";

/// HTTP User-Agent sent to RDAP services.
pub const DEFAULT_USER_AGENT: &str = concat!("whois_batch/", env!("CARGO_PKG_VERSION"));
