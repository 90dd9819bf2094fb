//! Deletes remote recordings older than the retention window.

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use storage::{FirebaseConnector, StoreConnector};
use telemetry::init_tracing_from_env;
use uploader_core::RetentionPolicy;
use video_uploader::cli::{exit, parse_args, require_dir_or_exit};
use video_uploader::load_config;
use worker::RetentionSweeper;

/// Remove remote recordings older than the retention window.
#[derive(Debug, Parser)]
#[command(name = "remove-old-videos", version, about)]
struct Cli {
    /// Directory holding the storage credentials file
    path_to_credentials: PathBuf,

    /// Keep recordings of the last N days (overrides retention.days)
    #[arg(long)]
    days: Option<u32>,

    /// Configuration file (defaults to config/uploader.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing_from_env();

    let cli: Cli = parse_args();
    let credentials_dir = require_dir_or_exit(&cli.path_to_credentials, "path-to-credentials");

    let config = load_config(cli.config.as_deref())?;
    let policy = cli.days.map(RetentionPolicy::new).unwrap_or(config.retention);

    let connector = FirebaseConnector::new(config.storage.clone(), credentials_dir);
    let store = match connector.connect().await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Remote storage not reachable");
            process::exit(exit::FAILURE);
        }
    };

    let sweeper = RetentionSweeper::new(store, policy, config.video_suffix.clone());
    let report = match sweeper.run().await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Retention sweep aborted");
            process::exit(exit::FAILURE);
        }
    };

    if report.is_success() {
        info!(deleted = report.deleted.len(), "All files older than {} days deleted", policy.days);
        return Ok(());
    }

    for name in report.failed_names() {
        error!("Not deleted: {}", name);
    }
    process::exit(exit::FAILURE);
}
