//! Request spacing for lookup channels.
//!
//! Every channel (rdap.org, Verisign RDAP, the WHOIS referral path, or a
//! named WHOIS server) gets a minimum interval between requests, 700 ms
//! unless overridden. Workers share one limiter, so the interval holds
//! across the whole worker pool.

mod limiter;

pub use limiter::ChannelRateLimiter;
