//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `whois_batch` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Reading the domain list and writing the export
//!
//! All core functionality is implemented in the library crate.

use std::io::Read;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use whois_batch::app::{print_failure_statistics, print_summary};
use whois_batch::export::write_export;
use whois_batch::initialization::init_logger_with;
use whois_batch::{BlobStore, Config, FileBlobStore, HistoryStore, LookupSession, Opt};

fn read_input(opt: &Opt) -> Result<String> {
    if opt.file.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read domains from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(&opt.file)
            .with_context(|| format!("Failed to read input file: {}", opt.file.display()))
    }
}

fn show_history(config: &Config) -> Result<()> {
    let store: Arc<dyn BlobStore> = Arc::new(FileBlobStore::new(&config.data_dir));
    let history = HistoryStore::load(store);
    let json = serde_json::to_string_pretty(&history.entries())
        .context("Failed to serialize history")?;
    println!("{json}");
    Ok(())
}

async fn run(opt: Opt) -> Result<()> {
    let config = Config::from(&opt);
    if opt.show_history {
        return show_history(&config);
    }

    let text = read_input(&opt)?;
    let session =
        LookupSession::from_config(config).context("Failed to initialize lookup session")?;
    let report = session.run_text(&text, &opt.source).await;

    print_summary(&report.stats, report.elapsed_seconds);
    print_failure_statistics(&report.failure_stats);

    if let Some(format) = opt.export {
        let count = write_export(format, &report.results, opt.output.as_deref())?;
        if let Some(path) = &opt.output {
            log::info!(
                "Exported {} domain{} to {}",
                count,
                if count == 1 { "" } else { "s" },
                path.display()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists), e.g. RUST_LOG
    let _ = dotenvy::dotenv();

    let opt = Opt::parse();

    init_logger_with(opt.log_level.clone().into(), opt.log_format.clone())
        .context("Failed to initialize logger")?;

    if let Err(e) = run(opt).await {
        eprintln!("whois_batch error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
