//! Camera video uploader
//!
//! Watches the directory the camera records into and uploads every finished
//! video to remote storage:
//! - Filesystem watch (created/closed events → upload queue)
//! - Upload supervisor with retries and reconnect backoff
//! - Graceful termination on SIGUSR1

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use storage::FirebaseConnector;
use telemetry::{init_tracing_from_env, metrics};
use video_uploader::cli::{parse_args, require_dir_or_exit};
use video_uploader::load_config;
use watcher::DirectoryWatcher;
use worker::Pipeline;

/// Upload finished camera recordings to remote storage.
#[derive(Debug, Parser)]
#[command(name = "video-uploader", version, about)]
struct Cli {
    /// Directory the camera writes recordings into
    path_to_monitor: PathBuf,

    /// Directory holding the storage credentials file
    path_to_credentials: PathBuf,

    /// Configuration file (defaults to config/uploader.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    let cli: Cli = parse_args();
    let monitor_dir = require_dir_or_exit(&cli.path_to_monitor, "path-to-monitor");
    let credentials_dir = require_dir_or_exit(&cli.path_to_credentials, "path-to-credentials");

    let config = load_config(cli.config.as_deref())?;

    info!("Starting video uploader v{}", env!("CARGO_PKG_VERSION"));
    info!(
        suffix = %config.video_suffix,
        max_attempts = config.upload.max_attempts,
        poll_interval_ms = config.supervisor.poll_interval_ms,
        "Loaded configuration"
    );

    let shutdown = CancellationToken::new();
    spawn_termination_listener(shutdown.clone()).context("Failed to install signal handler")?;
    info!(
        pid = std::process::id(),
        "Send SIGUSR1 to PID {} to terminate",
        std::process::id()
    );

    let (watcher, events) =
        DirectoryWatcher::start(&monitor_dir).context("Failed to start directory watcher")?;

    let connector = Arc::new(FirebaseConnector::new(config.storage.clone(), credentials_dir));
    let pipeline = Pipeline::new(config.pipeline(), connector, shutdown.clone());
    let registry = pipeline.registry();
    let handles = pipeline.start(events);

    let report = handles
        .supervisor
        .await
        .context("Upload supervisor task failed")?;

    // Closing the watcher drops the event sender and ends the ingest task.
    watcher.stop();
    if let Err(e) = handles.ingest.await {
        error!("Event ingest task failed: {}", e);
    }

    let remaining = registry.snapshot();
    info!(uploaded = report.uploaded, "Files left for upload: {}", remaining.len());
    for file in &remaining {
        info!(state = %file.state, attempts = file.attempts, " {}", file.path.display());
    }

    info!(metrics = ?metrics().snapshot(), "Shutdown complete");
    Ok(())
}

/// Cancels `shutdown` when SIGUSR1 arrives.
#[cfg(unix)]
fn spawn_termination_listener(shutdown: CancellationToken) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut usr1 = signal(SignalKind::user_defined1())?;
    tokio::spawn(async move {
        tokio::select! {
            received = usr1.recv() => {
                if received.is_some() {
                    info!("SIGUSR1 received, terminating");
                } else {
                    warn!("Signal stream closed, terminating");
                }
                shutdown.cancel();
            }
            _ = shutdown.cancelled() => {}
        }
    });
    Ok(())
}

/// Cancels `shutdown` on Ctrl+C where SIGUSR1 does not exist.
#[cfg(not(unix))]
fn spawn_termination_listener(shutdown: CancellationToken) -> std::io::Result<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl+C received, terminating"),
            Err(e) => {
                warn!("Failed to listen for Ctrl+C: {}", e);
                return;
            }
        }
        shutdown.cancel();
    });
    Ok(())
}
