//! Error type definitions.
//!
//! This module defines the lookup error taxonomy and the failure categories
//! counted during a batch run.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Errors produced while looking up domains.
///
/// Every failure is resolved to the narrowest scope: a bad token, one channel
/// for one domain, or the persisted store. None of them aborts a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Input is not something a lookup can be made for.
    #[error("invalid domain: {0}")]
    Validation(String),

    /// A source mode name could not be parsed.
    #[error("invalid source mode: {0}")]
    InvalidSource(String),

    /// A single channel query failed.
    #[error("{channel}: {message}")]
    Channel {
        /// Channel identifier (e.g. `rdap.org`)
        channel: String,
        /// Failure category, used for statistics
        kind: FailureKind,
        /// Human-readable description
        message: String,
    },

    /// The persisted blob store could not be read or written.
    #[error("store unavailable: {0}")]
    Store(String),
}

impl LookupError {
    /// Builds a channel failure.
    pub fn channel(
        channel: impl Into<String>,
        kind: FailureKind,
        message: impl Into<String>,
    ) -> Self {
        LookupError::Channel {
            channel: channel.into(),
            kind,
            message: message.into(),
        }
    }

    /// Failure category for statistics. Non-channel errors count as `Other`.
    pub fn kind(&self) -> FailureKind {
        match self {
            LookupError::Channel { kind, .. } => *kind,
            LookupError::Validation(_) | LookupError::InvalidSource(_) | LookupError::Store(_) => {
                FailureKind::Other
            }
        }
    }
}

/// Categories of channel failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureKind {
    /// The request did not complete within its timeout
    Timeout,
    /// Name resolution or TCP connection failed
    Connect,
    /// The service answered with a non-success HTTP status
    HttpStatus,
    /// The response could not be read or decoded
    Decode,
    /// The channel does not serve this domain (e.g. Verisign for a .org)
    Unsupported,
    /// Anything else
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "Lookup timeout",
            FailureKind::Connect => "Connection error",
            FailureKind::HttpStatus => "HTTP status error",
            FailureKind::Decode => "Response decode error",
            FailureKind::Unsupported => "Unsupported by channel",
            FailureKind::Other => "Other lookup error",
        }
    }
}

/// Categorizes a reqwest error into a failure kind.
pub fn categorize_reqwest_error(error: &ReqwestError) -> FailureKind {
    if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_connect() {
        FailureKind::Connect
    } else if error.is_status() {
        FailureKind::HttpStatus
    } else if error.is_decode() || error.is_body() {
        FailureKind::Decode
    } else {
        FailureKind::Other
    }
}

/// Categorizes an I/O error from a raw socket exchange.
pub fn categorize_io_error(error: &std::io::Error) -> FailureKind {
    use std::io::ErrorKind;
    match error.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => FailureKind::Timeout,
        ErrorKind::ConnectionRefused
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::NotConnected
        | ErrorKind::AddrNotAvailable => FailureKind::Connect,
        ErrorKind::InvalidData | ErrorKind::UnexpectedEof => FailureKind::Decode,
        _ => FailureKind::Other,
    }
}
