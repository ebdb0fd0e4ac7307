//! WHOIS/RDAP lookups.
//!
//! This module provides:
//! - The channel and source-mode model (`Channel`, `SourceMode`)
//! - Lookup records and per-domain results (`ParsedRecord`, `DomainResult`)
//! - The `ChannelQuery` seam and its network implementation
//! - Response parsers for WHOIS text and RDAP JSON
//! - The TTL result cache

mod cache;
mod channels;
mod parse;
mod types;

pub use cache::{CacheLookup, ResultCache};
pub use channels::{ChannelQuery, NetworkChannels};
pub use parse::{parse_iana_referral, parse_rdap_json, parse_whois_text};
pub use types::{Channel, DomainResult, ParsedRecord, SourceMode, STRUCTURED_SOURCES};
