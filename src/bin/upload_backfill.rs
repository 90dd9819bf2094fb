//! Uploads one day's recordings from a local directory.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use storage::{FirebaseConnector, StoreConnector};
use telemetry::init_tracing_from_env;
use uploader_core::naming::parse_date;
use video_uploader::cli::{exit, parse_args, require_dir_or_exit};
use video_uploader::load_config;
use worker::{BackfillWorker, UploadWorker};

/// Upload every recording of one day that the uploader missed.
#[derive(Debug, Parser)]
#[command(name = "upload-backfill", version, about)]
struct Cli {
    /// Recording date, YYYY-MM-DD
    date: String,

    /// Directory holding the storage credentials file
    path_to_credentials: PathBuf,

    /// Directory holding the recordings
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Configuration file (defaults to config/uploader.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing_from_env();

    let cli: Cli = parse_args();
    let date = match parse_date(&cli.date) {
        Ok(date) => date,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(exit::INVALID_DATE);
        }
    };
    let credentials_dir = require_dir_or_exit(&cli.path_to_credentials, "path-to-credentials");
    let dir = require_dir_or_exit(&cli.dir, "recordings directory");

    let config = load_config(cli.config.as_deref())?;

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current attempt");
            ctrl_c.cancel();
        }
    });

    let connector = FirebaseConnector::new(config.storage.clone(), credentials_dir);
    let store = match connector.connect().await {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "Remote storage not reachable");
            process::exit(exit::FAILURE);
        }
    };

    let worker = BackfillWorker::new(
        UploadWorker::new(config.upload.clone(), shutdown),
        config.video_suffix.clone(),
    );
    let result = worker
        .run(store.as_ref(), &dir, date)
        .await
        .context("Failed to read recordings directory")?;

    if result.is_success() {
        info!(uploaded = result.uploaded.len(), "Backfill for {} complete", date);
        return Ok(());
    }

    for path in &result.failed {
        error!("Upload not successful: {}", path.display());
    }
    process::exit(exit::FAILURE);
}
