// Shared test helpers: a scripted channel implementation and session builders.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use whois_batch::{
    BlobStore, Channel, ChannelQuery, Config, FailureKind, LookupError, LookupSession,
    MemoryBlobStore, ParsedRecord,
};

/// Answers channel queries from a script instead of the network.
///
/// Unscripted `(domain, channel)` pairs fail with a connection error.
#[derive(Default)]
#[allow(dead_code)] // Not every test file uses every helper
pub struct ScriptedChannels {
    answers: Mutex<HashMap<(String, String), Result<ParsedRecord, LookupError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl ScriptedChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts a successful answer; the record's source is the channel name
    /// for RDAP channels and a WHOIS host otherwise.
    pub fn succeed(&self, domain: &str, channel: &Channel, registrar: &str) {
        let source = match channel {
            Channel::IanaWhois => "whois.verisign-grs.com".to_string(),
            other => other.name().to_string(),
        };
        let mut record = ParsedRecord::new(domain, source);
        record.registrar = Some(registrar.to_string());
        record.name_servers = Some(vec![format!("ns1.{domain}")]);
        self.answers
            .lock()
            .expect("lock")
            .insert((domain.to_string(), channel.name().to_string()), Ok(record));
    }

    /// Scripts a failure.
    pub fn fail(&self, domain: &str, channel: &Channel, kind: FailureKind, message: &str) {
        self.answers.lock().expect("lock").insert(
            (domain.to_string(), channel.name().to_string()),
            Err(LookupError::channel(channel.name(), kind, message)),
        );
    }

    /// Every query received so far, as `(domain, channel name)`.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("lock").len()
    }

    pub fn calls_for(&self, domain: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(d, _)| d == domain)
            .map(|(_, channel)| channel)
            .collect()
    }
}

#[async_trait]
impl ChannelQuery for ScriptedChannels {
    async fn query(&self, domain: &str, channel: &Channel) -> Result<ParsedRecord, LookupError> {
        self.calls
            .lock()
            .expect("lock")
            .push((domain.to_string(), channel.name().to_string()));
        // Yield so concurrent workers interleave
        tokio::task::yield_now().await;
        self.answers
            .lock()
            .expect("lock")
            .get(&(domain.to_string(), channel.name().to_string()))
            .cloned()
            .unwrap_or_else(|| {
                Err(LookupError::channel(
                    channel.name(),
                    FailureKind::Connect,
                    "connection refused",
                ))
            })
    }
}

/// Config with no request spacing, so tests run at full speed.
#[allow(dead_code)]
pub fn fast_config(workers: usize) -> Config {
    Config {
        workers,
        min_interval: Duration::ZERO,
        ..Default::default()
    }
}

/// Session over scripted channels and an in-memory store.
#[allow(dead_code)]
pub fn scripted_session(
    config: Config,
    channels: &Arc<ScriptedChannels>,
) -> (LookupSession, Arc<dyn BlobStore>) {
    let store: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());
    let channels_dyn: Arc<dyn ChannelQuery> = Arc::clone(channels) as Arc<dyn ChannelQuery>;
    let session = LookupSession::new(config, channels_dyn, Arc::clone(&store));
    (session, store)
}
