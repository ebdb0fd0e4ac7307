//! Domain parsing and validation.
//!
//! Turns free-form user input into a [`DomainSet`]: an ordered, deduplicated
//! set of lowercase domain names. Anything that does not look like a domain
//! is silently dropped, so a batch is always best-effort.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Longest domain name accepted (RFC 1035 presentation form).
const MAX_DOMAIN_LENGTH: usize = 253;

/// Labels of 1-63 alphanumerics/hyphens, no leading or trailing hyphen, and an
/// alphabetic top-level label of at least two characters.
static DOMAIN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$")
        .expect("domain pattern is a valid regex")
});

/// Returns true if `candidate` (already normalized) is a syntactically valid domain.
pub fn is_valid_domain(candidate: &str) -> bool {
    candidate.len() <= MAX_DOMAIN_LENGTH && DOMAIN_PATTERN.is_match(candidate)
}

/// Trims and lowercases a single token.
pub fn normalize_domain(token: &str) -> String {
    token.trim().to_ascii_lowercase()
}

/// An ordered set of normalized domain names.
///
/// Order follows first appearance in the input. Two spellings that normalize
/// to the same name count once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainSet {
    domains: Vec<String>,
}

impl DomainSet {
    /// Parses free-form text into a domain set.
    ///
    /// Tokens are separated by whitespace, commas, or semicolons. Invalid tokens
    /// are dropped; empty or fully-invalid input yields an empty set.
    pub fn parse(text: &str) -> Self {
        let mut seen = HashSet::new();
        let mut domains = Vec::new();

        for token in text.split(|c: char| c.is_whitespace() || c == ',' || c == ';') {
            let normalized = normalize_domain(token);
            if normalized.is_empty() {
                continue;
            }
            if !is_valid_domain(&normalized) {
                log::debug!("Skipping invalid domain token: {}", token.trim());
                continue;
            }
            if seen.insert(normalized.clone()) {
                domains.push(normalized);
            }
        }

        DomainSet { domains }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.iter().any(|d| d == domain)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.domains
    }

    pub fn into_vec(self) -> Vec<String> {
        self.domains
    }
}

impl<'a> IntoIterator for &'a DomainSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.domains.iter()
    }
}

/// Extracts the top-level label of a domain (`"com"` for `"example.com"`).
pub fn extract_tld(domain: &str) -> Option<&str> {
    let (_, tld) = domain.rsplit_once('.')?;
    if tld.is_empty() {
        None
    } else {
        Some(tld)
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
