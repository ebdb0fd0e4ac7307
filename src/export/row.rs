//! Shared export row building logic.
//!
//! Both exporters flatten a [`DomainResult`] the same way: the record columns
//! come from `best`, so a failed domain exports with empty record columns.

use serde::Serialize;

use crate::whois::DomainResult;

/// One exported domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub domain: String,
    pub source: Option<String>,
    pub registrar: Option<String>,
    pub registrant: Option<String>,
    pub created: Option<String>,
    pub expires: Option<String>,
    pub updated: Option<String>,
    pub status: Option<Vec<String>>,
    pub name_servers: Option<Vec<String>>,
    pub error: Option<String>,
}

impl From<&DomainResult> for ExportRow {
    fn from(result: &DomainResult) -> Self {
        let best = result.best.as_ref();
        ExportRow {
            domain: result.domain.clone(),
            source: best.map(|r| r.source.clone()),
            registrar: best.and_then(|r| r.registrar.clone()),
            registrant: best.and_then(|r| r.registrant.clone()),
            created: best.and_then(|r| r.created.clone()),
            expires: best.and_then(|r| r.expires.clone()),
            updated: best.and_then(|r| r.updated.clone()),
            status: best.and_then(|r| r.status.clone()),
            name_servers: best.and_then(|r| r.name_servers.clone()),
            error: result.error.clone(),
        }
    }
}
