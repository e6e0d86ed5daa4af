//! # Newsflow
//!
//! A news ingestion-and-synchronization pipeline: harvest articles from RSS
//! feed sources, extract and normalize their content, deduplicate them by a
//! content fingerprint, and coordinate an out-of-band translation step
//! through a pull/push work queue against a remote store and a
//! text-generation oracle.
//!
//! ## Usage
//!
//! ```sh
//! newsflow harvest --sources sources.yaml --store-url http://localhost:8080/api
//! newsflow translate --store-url http://localhost:8080/api --language ko
//! ```
//!
//! ## Architecture
//!
//! Two phases share one core:
//! 1. **Harvest**: parse the configured feeds, filter out-of-region
//!    entries, run the extraction fallback chain, classify and assemble
//!    canonical articles, then deliver them in one bulk ingest or snapshot
//! 2. **Translate**: pull pending tasks from the store, drive the oracle
//!    through each one, push results, and leave failed tasks pending for a
//!    future pull
//!
//! Everything runs strictly sequentially; the only scheduling discipline is
//! a flat inter-call sleep.

use clap::Parser;
use std::error::Error;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod assemble;
mod classify;
mod cli;
mod config;
mod extract;
mod filter;
mod harvest;
mod models;
mod normalize;
mod oracle;
mod snapshot;
mod store;
mod utils;
mod workqueue;

use cli::{Cli, Command};
use harvest::HarvestOptions;
use oracle::ChatClient;
use workqueue::TranslateOptions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newsflow starting up");

    let args = Cli::parse();
    match args.command {
        Command::Harvest {
            sources,
            store_url,
            snapshot,
            days_limit,
            date_policy,
            oracle,
        } => {
            let client = ChatClient::new(&oracle.oracle_url, oracle.oracle_key, &oracle.oracle_model)?;
            let opts = HarvestOptions {
                sources_path: sources,
                store_url,
                snapshot_path: snapshot,
                days_limit,
                date_policy,
                article_delay: harvest::ARTICLE_DELAY,
            };
            let delivered = harvest::run(&client, &opts).await?;
            info!(delivered, "harvest finished");
        }
        Command::Translate {
            store_url,
            language,
            limit,
            snapshot,
            oracle,
        } => {
            let client = ChatClient::new(&oracle.oracle_url, oracle.oracle_key, &oracle.oracle_model)?;
            let opts = TranslateOptions {
                store_url,
                language_target: language,
                limit,
                snapshot_path: snapshot,
                task_delay: workqueue::TASK_DELAY,
            };
            let summary = workqueue::run(&client, &opts).await?;
            info!(
                pulled = summary.pulled,
                translated = summary.translated,
                pushed = summary.pushed,
                skipped = summary.skipped,
                "translation finished"
            );
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, secs = elapsed.as_secs(), "execution complete");

    Ok(())
}
