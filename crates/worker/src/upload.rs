//! Bounded-retry upload of a single file.

use crate::backoff::{retry_with_backoff, Backoff, Retry};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use storage::ObjectStore;
use telemetry::metrics;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uploader_core::{ErrorClass, StorageError};

/// Upload retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Attempts per file and drain cycle
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay after the first failed attempt, doubled after each further one
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Whether rejected requests are retried like connectivity failures
    #[serde(default = "default_retry_permanent_errors")]
    pub retry_permanent_errors: bool,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_retry_permanent_errors() -> bool {
    true
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            retry_permanent_errors: default_retry_permanent_errors(),
        }
    }
}

impl UploadConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

/// Why an upload did not succeed.
#[derive(Debug, Clone, Error)]
pub enum FailureReason {
    #[error("exhausted retries: {0}")]
    Exhausted(StorageError),

    #[error("rejected: {0}")]
    Rejected(StorageError),

    #[error("storage unavailable: {0}")]
    CapabilityLost(StorageError),

    #[error("local file unreadable: {0}")]
    LocalFileMissing(StorageError),

    #[error("interrupted by shutdown")]
    Interrupted,
}

/// A failed upload and the attempts spent on it.
#[derive(Debug, Clone)]
pub struct UploadFailure {
    pub reason: FailureReason,
    pub attempts: u32,
}

/// Result of [`UploadWorker::attempt_upload`].
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Success { remote_name: String, attempts: u32 },
    Failure(UploadFailure),
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Drives one file through bounded retries against a store.
///
/// Does not touch the registry; the caller records the outcome.
#[derive(Clone)]
pub struct UploadWorker {
    config: UploadConfig,
    shutdown: CancellationToken,
}

impl UploadWorker {
    pub fn new(config: UploadConfig, shutdown: CancellationToken) -> Self {
        Self { config, shutdown }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    pub async fn attempt_upload(&self, store: &dyn ObjectStore, path: &Path) -> UploadOutcome {
        let file = path.display();
        info!(path = %file, "Trying to upload");

        let mut backoff = Backoff::uncapped(self.config.initial_delay());
        let max_attempts = self.config.max_attempts.max(1);
        let retry_permanent = self.config.retry_permanent_errors;
        let started = Instant::now();

        let result = retry_with_backoff(
            &mut backoff,
            Some(max_attempts),
            &self.shutdown,
            move |_| {
                metrics().upload_attempts.inc();
                store.put(path)
            },
            |err: &StorageError, attempt| {
                let retry = match err.class() {
                    ErrorClass::Transient => true,
                    ErrorClass::Permanent => retry_permanent,
                    ErrorClass::Unavailable | ErrorClass::LocalFile => false,
                };
                if retry && attempt < max_attempts {
                    metrics().upload_retries.inc();
                    warn!(path = %file, attempt, error = %err, "Upload attempt failed, retrying");
                }
                retry
            },
        )
        .await;

        match result {
            Retry::Done { value, attempts } => {
                metrics().uploads_succeeded.inc();
                metrics()
                    .upload_latency_ms
                    .observe(started.elapsed().as_millis() as u64);
                info!(path = %file, remote = %value, attempts, "Upload successful");
                UploadOutcome::Success {
                    remote_name: value,
                    attempts,
                }
            }
            Retry::Exhausted { error, attempts } => {
                self.failed(path, FailureReason::Exhausted(error), attempts)
            }
            Retry::Aborted { error, attempts } => {
                let reason = match error.class() {
                    ErrorClass::Unavailable => FailureReason::CapabilityLost(error),
                    ErrorClass::LocalFile => FailureReason::LocalFileMissing(error),
                    _ => FailureReason::Rejected(error),
                };
                self.failed(path, reason, attempts)
            }
            Retry::Cancelled { attempts, .. } => {
                self.failed(path, FailureReason::Interrupted, attempts)
            }
        }
    }

    fn failed(&self, path: &Path, reason: FailureReason, attempts: u32) -> UploadOutcome {
        metrics().uploads_failed.inc();
        warn!(path = %path.display(), attempts, reason = %reason, "Upload not successful");
        UploadOutcome::Failure(UploadFailure { reason, attempts })
    }
}
