//! WHOIS text and RDAP JSON parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::types::ParsedRecord;

static REGISTRAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:Registrar|Sponsoring Registrar)\s*:\s*(.+)$").expect("valid regex")
});
static REGISTRANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:Registrant Organization|Registrant Name|Registrant)\s*:\s*(.+)$")
        .expect("valid regex")
});
static CREATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:Creation Date|Created On|Created|Domain Registration Date|Registered|Registration Time)\s*:\s*(.+)$",
    )
    .expect("valid regex")
});
static EXPIRES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:Registry Expiry Date|Registrar Registration Expiration Date|Expiration Date|Expires On|Expiry Date|Expiration Time)\s*:\s*(.+)$",
    )
    .expect("valid regex")
});
static UPDATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:Updated Date|Last Updated On|Last Updated|Last Modified)\s*:\s*(.+)$")
        .expect("valid regex")
});
static NAME_SERVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:Name Server|nserver)\s*:\s*(.+)$").expect("valid regex")
});
static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:Domain Status|Status)\s*:\s*(.+)$").expect("valid regex")
});

fn capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses a free-text WHOIS response.
///
/// The first match wins for single-valued fields. Name servers and status
/// lines are collected in order. Status values keep only their first word,
/// dropping the ICANN explanation URL that usually follows.
pub fn parse_whois_text(domain: &str, source: &str, text: &str) -> ParsedRecord {
    let mut record = ParsedRecord::new(domain, source);
    let mut name_servers: Vec<String> = Vec::new();
    let mut status: Vec<String> = Vec::new();

    for line in text.lines() {
        if let Some(value) = capture(&REGISTRAR_RE, line) {
            record.registrar.get_or_insert(value);
        } else if let Some(value) = capture(&REGISTRANT_RE, line) {
            record.registrant.get_or_insert(value);
        } else if let Some(value) = capture(&CREATED_RE, line) {
            record.created.get_or_insert(value);
        } else if let Some(value) = capture(&EXPIRES_RE, line) {
            record.expires.get_or_insert(value);
        } else if let Some(value) = capture(&UPDATED_RE, line) {
            record.updated.get_or_insert(value);
        } else if let Some(value) = capture(&NAME_SERVER_RE, line) {
            let ns = value.to_ascii_lowercase();
            if !name_servers.contains(&ns) {
                name_servers.push(ns);
            }
        } else if let Some(value) = capture(&STATUS_RE, line) {
            if let Some(code) = value.split_whitespace().next() {
                status.push(code.to_string());
            }
        }
    }

    record.name_servers = (!name_servers.is_empty()).then_some(name_servers);
    record.status = (!status.is_empty()).then_some(status);
    record.raw_text = Some(text.to_string());
    record
}

/// Finds the WHOIS server named in an IANA referral response.
///
/// IANA answers a TLD query with `refer:` (and usually `whois:`) lines.
pub fn parse_iana_referral(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let (key, value) = line.trim().split_once(':')?;
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        if (key == "refer" || key == "whois") && !value.is_empty() {
            Some(value.to_ascii_lowercase())
        } else {
            None
        }
    })
}

/// Extracts the `fn` (formatted name) property from an RDAP entity's vCard.
///
/// vcardArray is `["vcard", [["fn", {}, "text", "Name"], ...]]`.
fn vcard_formatted_name(entity: &Value) -> Option<String> {
    entity
        .get("vcardArray")?
        .get(1)?
        .as_array()?
        .iter()
        .find(|prop| prop.get(0).and_then(Value::as_str) == Some("fn"))
        .and_then(|prop| prop.get(3))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn string_list(values: Option<&Value>, field: Option<&str>) -> Option<Vec<String>> {
    let list: Vec<String> = values?
        .as_array()?
        .iter()
        .filter_map(|v| match field {
            Some(field) => v.get(field).and_then(Value::as_str),
            None => v.as_str(),
        })
        .map(str::to_string)
        .collect();
    (!list.is_empty()).then_some(list)
}

/// Parses an RDAP domain response (RFC 9083).
pub fn parse_rdap_json(domain: &str, source: &str, value: &Value) -> ParsedRecord {
    let mut record = ParsedRecord::new(domain, source);

    if let Some(events) = value.get("events").and_then(Value::as_array) {
        for event in events {
            let action = event.get("eventAction").and_then(Value::as_str);
            let date = event
                .get("eventDate")
                .and_then(Value::as_str)
                .map(str::to_string);
            match action {
                Some("registration") => record.created = date,
                Some("expiration") => record.expires = date,
                Some("last changed") | Some("last update of RDAP database")
                    if record.updated.is_none() || action == Some("last changed") =>
                {
                    record.updated = date
                }
                _ => {}
            }
        }
    }

    record.status = string_list(value.get("status"), None);
    record.name_servers = string_list(value.get("nameservers"), Some("ldhName"))
        .map(|list| list.into_iter().map(|ns| ns.to_ascii_lowercase()).collect());

    if let Some(entities) = value.get("entities").and_then(Value::as_array) {
        for entity in entities {
            let roles: Vec<&str> = entity
                .get("roles")
                .and_then(Value::as_array)
                .map(|roles| roles.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            let Some(name) = vcard_formatted_name(entity) else {
                continue;
            };
            if roles.contains(&"registrar") && record.registrar.is_none() {
                record.registrar = Some(name.clone());
            }
            if roles.contains(&"registrant") && record.registrant.is_none() {
                record.registrant = Some(name);
            }
        }
    }

    record.raw_text = Some(value.to_string());
    record
}
