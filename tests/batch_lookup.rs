//! End-to-end batch lookups over scripted channels.

mod helpers;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use helpers::{fast_config, scripted_session, ScriptedChannels};
use tempfile::TempDir;
use whois_batch::{
    BlobStore, Channel, ChannelQuery, Config, DomainSet, FailureKind, FileBlobStore,
    LookupSession, SourceMode,
};

#[tokio::test]
async fn test_mixed_input_is_deduplicated_and_looked_up() {
    let channels = Arc::new(ScriptedChannels::new());
    channels.succeed("example.com", &Channel::RdapOrg, "Example Registrar");
    channels.succeed("openai.com", &Channel::RdapOrg, "MarkMonitor Inc.");
    let (session, _) = scripted_session(fast_config(6), &channels);

    let report = session
        .run_text("EXAMPLE.com, example.com\nbad_domain\nopenai.com", &SourceMode::Auto)
        .await;

    assert_eq!(report.stats.total, 2);
    assert_eq!(report.stats.completed, 2);
    assert_eq!(report.stats.success, 2);
    assert_eq!(report.results.len(), 2);
    assert!(report.result("example.com").is_some());
    assert!(report.result("openai.com").is_some());
    assert_eq!(session.history().len(), 2);
    // rdap.org answered for both, so nothing else was asked
    assert_eq!(channels.call_count(), 2);
}

#[tokio::test]
async fn test_all_failing_domain_has_joined_error_and_no_history() {
    let channels = Arc::new(ScriptedChannels::new());
    channels.fail("down.com", &Channel::RdapOrg, FailureKind::HttpStatus, "unexpected status 404");
    channels.fail("down.com", &Channel::VerisignRdap, FailureKind::Timeout, "timed out");
    channels.fail("down.com", &Channel::IanaWhois, FailureKind::Connect, "connection refused");
    let (session, _) = scripted_session(fast_config(2), &channels);

    let report = session.run_text("down.com", &SourceMode::Auto).await;
    let result = report.result("down.com").expect("result present");

    assert!(result.best.is_none());
    assert!(result.channels.is_empty());
    assert_eq!(
        result.error.as_deref(),
        Some(
            "rdap.org: unexpected status 404; rdap.verisign.com: timed out; \
             whois-referral: connection refused"
        )
    );
    assert_eq!(report.stats.failed, 1);
    assert_eq!(report.failure_stats.total(), 3);
    assert_eq!(report.failure_stats.get(FailureKind::Timeout), 1);
    assert!(session.history().is_empty());
    assert!(session.cache().is_empty());
}

#[tokio::test]
async fn test_every_domain_finishes_for_any_worker_count() {
    let domains: Vec<String> = (0..5).map(|i| format!("d{i}.com")).collect();
    let text = domains.join(" ");

    for workers in [1, 3, 5, 16] {
        let channels = Arc::new(ScriptedChannels::new());
        for domain in &domains {
            channels.succeed(domain, &Channel::RdapOrg, "R");
        }
        let (session, _) = scripted_session(fast_config(workers), &channels);

        let report = session.run_text(&text, &SourceMode::Auto).await;
        assert_eq!(report.results.len(), 5, "workers = {workers}");
        for result in &report.results {
            let finished = result.finished_at.expect("finished");
            assert!(finished >= result.started_at);
        }
        assert_eq!(report.stats.success, 5);
        assert_eq!(channels.call_count(), 5);
    }
}

#[tokio::test]
async fn test_auto_falls_through_to_next_channel() {
    let channels = Arc::new(ScriptedChannels::new());
    channels.fail("example.com", &Channel::RdapOrg, FailureKind::Timeout, "timed out");
    channels.succeed("example.com", &Channel::VerisignRdap, "Verisign Answer");
    let (session, _) = scripted_session(fast_config(1), &channels);

    let report = session.run_text("example.com", &SourceMode::Auto).await;
    let result = report.result("example.com").expect("result");

    assert_eq!(channels.calls_for("example.com"), vec!["rdap.org", "rdap.verisign.com"]);
    assert_eq!(result.channels.len(), 1);
    assert_eq!(
        result.best.as_ref().and_then(|r| r.registrar.as_deref()),
        Some("Verisign Answer")
    );
    assert!(result.error.is_none());
    // The earlier failure is still counted
    assert_eq!(report.failure_stats.get(FailureKind::Timeout), 1);
}

#[tokio::test]
async fn test_auto_skips_verisign_for_other_tlds() {
    let channels = Arc::new(ScriptedChannels::new());
    channels.succeed("example.org", &Channel::IanaWhois, "Whois Only");
    let (session, _) = scripted_session(fast_config(1), &channels);

    let report = session.run_text("example.org", &SourceMode::Auto).await;

    assert_eq!(channels.calls_for("example.org"), vec!["rdap.org", "whois-referral"]);
    assert!(report.result("example.org").expect("result").is_success());
}

#[tokio::test]
async fn test_all_mode_keeps_every_record_and_prefers_structured() {
    let channels = Arc::new(ScriptedChannels::new());
    channels.fail("example.com", &Channel::RdapOrg, FailureKind::HttpStatus, "status 500");
    channels.succeed("example.com", &Channel::VerisignRdap, "From RDAP");
    channels.succeed("example.com", &Channel::IanaWhois, "From WHOIS");
    let (session, _) = scripted_session(fast_config(1), &channels);

    let report = session.run_text("example.com", &SourceMode::All).await;
    let result = report.result("example.com").expect("result");

    assert_eq!(channels.calls_for("example.com").len(), 3);
    assert_eq!(result.channels.len(), 2);
    assert_eq!(
        result.best.as_ref().map(|r| r.source.as_str()),
        Some("rdap.verisign.com")
    );
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_named_modes_query_exactly_one_channel() {
    let channels = Arc::new(ScriptedChannels::new());
    let server = Channel::Server("whois.nic.io".to_string());
    channels.succeed("example.io", &server, "NIC.IO");
    let (session, _) = scripted_session(fast_config(1), &channels);

    let report = session
        .run_text("example.io", &SourceMode::Server("whois.nic.io".to_string()))
        .await;
    assert_eq!(channels.calls(), vec![("example.io".to_string(), "whois.nic.io".to_string())]);
    assert!(report.stats.success == 1);

    let report = session.run_text("example.io", &SourceMode::RdapOrg).await;
    assert_eq!(channels.calls_for("example.io"), vec!["whois.nic.io", "rdap.org"]);
    assert_eq!(report.stats.failed, 1);
}

#[tokio::test]
async fn test_cache_hit_skips_channels() {
    let channels = Arc::new(ScriptedChannels::new());
    channels.succeed("a.com", &Channel::RdapOrg, "R");
    channels.succeed("b.com", &Channel::RdapOrg, "R");
    let (session, _) = scripted_session(fast_config(2), &channels);

    let first = session.run_text("a.com b.com", &SourceMode::Auto).await;
    assert_eq!(first.stats.cached, 0);
    assert_eq!(channels.call_count(), 2);

    let second = session.run_text("a.com b.com", &SourceMode::Auto).await;
    assert_eq!(channels.call_count(), 2);
    assert_eq!(second.stats.success, 2);
    assert_eq!(second.stats.cached, 2);
    for result in &second.results {
        assert!(result.from_cache);
        assert!(result.finished_at.expect("finished") >= result.started_at);
    }
    // Cache hits are not recorded again
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn test_cache_is_isolated_per_mode() {
    let channels = Arc::new(ScriptedChannels::new());
    channels.succeed("a.com", &Channel::RdapOrg, "R");
    let (session, _) = scripted_session(fast_config(1), &channels);

    session.run_text("a.com", &SourceMode::Auto).await;
    let report = session.run_text("a.com", &SourceMode::RdapOrg).await;

    assert_eq!(channels.call_count(), 2);
    assert!(!report.results[0].from_cache);
}

#[tokio::test]
async fn test_failures_are_retried_on_the_next_run() {
    let channels = Arc::new(ScriptedChannels::new());
    let (session, _) = scripted_session(fast_config(1), &channels);

    session.run_text("x.org", &SourceMode::RdapOrg).await;
    session.run_text("x.org", &SourceMode::RdapOrg).await;
    assert_eq!(channels.call_count(), 2);
}

#[tokio::test]
async fn test_disabled_cache_still_records_history() {
    let channels = Arc::new(ScriptedChannels::new());
    channels.succeed("a.com", &Channel::RdapOrg, "R");
    let config = Config {
        use_cache: false,
        ..fast_config(1)
    };
    let (session, _) = scripted_session(config, &channels);

    session.run_text("a.com", &SourceMode::Auto).await;
    session.run_text("a.com", &SourceMode::Auto).await;

    assert_eq!(channels.call_count(), 2);
    assert!(session.cache().is_empty());
    assert_eq!(session.history().len(), 2);
}

#[tokio::test]
async fn test_state_persists_across_sessions() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let channels = Arc::new(ScriptedChannels::new());
    channels.succeed("a.com", &Channel::RdapOrg, "R");

    let new_session = || {
        let store: Arc<dyn BlobStore> = Arc::new(FileBlobStore::new(dir.path()));
        let channels: Arc<dyn ChannelQuery> = Arc::clone(&channels) as Arc<dyn ChannelQuery>;
        LookupSession::new(fast_config(1), channels, store)
    };

    new_session().run_text("a.com", &SourceMode::Auto).await;
    assert!(dir.path().join("cache.json").exists());
    assert!(dir.path().join("history.json").exists());

    let reopened = new_session();
    assert_eq!(reopened.history().len(), 1);
    let report = reopened.run_text("a.com", &SourceMode::Auto).await;
    assert!(report.results[0].from_cache);
    assert_eq!(channels.call_count(), 1);
}

#[tokio::test]
async fn test_progress_callback_sees_every_publication() {
    let channels = Arc::new(ScriptedChannels::new());
    channels.succeed("a.com", &Channel::RdapOrg, "R");
    let (session, _) = scripted_session(fast_config(2), &channels);

    let seen = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));
    let session = {
        let seen = Arc::clone(&seen);
        let finished = Arc::clone(&finished);
        session.with_progress_callback(move |result| {
            seen.fetch_add(1, Ordering::SeqCst);
            if result.is_finished() {
                finished.fetch_add(1, Ordering::SeqCst);
            }
        })
    };

    session.run_text("a.com b.com", &SourceMode::Auto).await;

    // a.com: in flight, record arrived, finished; b.com: in flight, finished
    assert_eq!(seen.load(Ordering::SeqCst), 5);
    assert_eq!(finished.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_live_total_is_the_batch_size() {
    let channels = Arc::new(ScriptedChannels::new());
    let (session, _) = scripted_session(fast_config(1), &channels);
    let table = session.table();

    let totals = Arc::new(Mutex::new(Vec::new()));
    let session = {
        let totals = Arc::clone(&totals);
        session.with_progress_callback(move |_| {
            totals.lock().unwrap().push(table.stats().total);
        })
    };

    let input = (0..10).map(|i| format!("d{i}.com")).collect::<Vec<_>>().join(" ");
    let report = session.run_text(&input, &SourceMode::RdapOrg).await;

    let totals = totals.lock().unwrap();
    assert_eq!(report.stats.total, 10);
    assert!(!totals.is_empty());
    assert!(totals.iter().all(|&total| total == 10), "totals: {totals:?}");
}

#[tokio::test]
async fn test_table_reflects_last_batch() {
    let channels = Arc::new(ScriptedChannels::new());
    let (session, _) = scripted_session(fast_config(2), &channels);
    let table = session.table();

    session.run_text("a.com b.com c.com", &SourceMode::RdapOrg).await;
    assert_eq!(table.len(), 3);

    session.run_text("d.com", &SourceMode::RdapOrg).await;
    assert_eq!(table.len(), 1);
    assert_eq!(table.stats().total, 1);
}

#[tokio::test]
async fn test_empty_input_runs_nothing() {
    let channels = Arc::new(ScriptedChannels::new());
    let (session, _) = scripted_session(fast_config(4), &channels);

    let report = session.run_batch(&DomainSet::parse(" ,; bad_domain "), &SourceMode::Auto).await;
    assert_eq!(report.stats.total, 0);
    assert!(report.results.is_empty());
    assert_eq!(channels.call_count(), 0);
}

#[tokio::test]
async fn test_rate_limit_composes_with_worker_pool() {
    let channels = Arc::new(ScriptedChannels::new());
    let interval = Duration::from_millis(40);
    let config = Config {
        workers: 4,
        min_interval: interval,
        ..Default::default()
    };
    let (session, _) = scripted_session(config, &channels);

    let start = Instant::now();
    session
        .run_text("a.com b.com c.com d.com", &SourceMode::RdapOrg)
        .await;

    // Four requests on one channel need three full intervals between them
    assert!(start.elapsed() >= interval * 3);
    assert_eq!(channels.call_count(), 4);
}

#[tokio::test]
async fn test_network_session_limiter_follows_config() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = Config::default();
    config.data_dir = dir.path().to_path_buf();
    config.min_interval = Duration::from_millis(250);
    config
        .channel_intervals
        .insert("whois.verisign-grs.com".to_string(), Duration::from_secs(2));

    let session = LookupSession::from_config(config).expect("session");
    let limiter = session.rate_limiter();
    assert_eq!(limiter.interval_for("whois-referral"), Duration::from_millis(250));
    assert_eq!(limiter.interval_for("whois.verisign-grs.com"), Duration::from_secs(2));
}
