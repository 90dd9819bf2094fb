//! Outer upload loop: connect, drain closed files, idle, reconnect.

use crate::backoff::{retry_with_backoff, sleep_or_cancelled, Backoff, Retry};
use crate::registry::FileRegistry;
use crate::upload::{FailureReason, UploadConfig, UploadOutcome, UploadWorker};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use storage::{ObjectStore, StoreConnector};
use telemetry::metrics;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uploader_core::{StorageError, TrackedFile};

/// Supervisor timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    /// Wait between drain cycles
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// First reconnect delay
    #[serde(default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,
    /// Reconnect delay cap
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    10_000
}

fn default_backoff_initial_ms() -> u64 {
    1_000
}

fn default_backoff_max_ms() -> u64 {
    60_000
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            backoff_initial_ms: default_backoff_initial_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

impl SupervisorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn backoff(&self) -> Backoff {
        Backoff::capped(
            Duration::from_millis(self.backoff_initial_ms),
            Duration::from_millis(self.backoff_max_ms),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Connecting,
    Draining,
    Idle,
    Stopped,
}

impl SupervisorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Draining => "draining",
            Self::Idle => "idle",
            Self::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the supervisor leaves behind when it stops.
#[derive(Debug, Clone, Default)]
pub struct ShutdownReport {
    /// Files uploaded during the run
    pub uploaded: usize,
    /// Every file still tracked, in queue order
    pub remaining: Vec<TrackedFile>,
}

enum CycleEnd {
    Completed,
    CapabilityLost,
    Interrupted,
}

/// Owns the storage capability and moves closed files to remote storage
/// until the shutdown token fires.
pub struct PipelineSupervisor {
    registry: Arc<FileRegistry>,
    connector: Arc<dyn StoreConnector>,
    uploader: UploadWorker,
    config: SupervisorConfig,
    shutdown: CancellationToken,
    state: watch::Sender<SupervisorState>,
}

impl PipelineSupervisor {
    pub fn new(
        registry: Arc<FileRegistry>,
        connector: Arc<dyn StoreConnector>,
        upload: UploadConfig,
        config: SupervisorConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(SupervisorState::Connecting);
        Self {
            registry,
            connector,
            uploader: UploadWorker::new(upload, shutdown.clone()),
            config,
            shutdown,
            state,
        }
    }

    /// Receiver that observes state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SupervisorState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> SupervisorState {
        *self.state.borrow()
    }

    /// Runs until shutdown and returns what is left to upload.
    pub async fn run(self) -> ShutdownReport {
        let mut backoff = self.config.backoff();
        let mut uploaded = 0usize;

        'connect: loop {
            self.set_state(SupervisorState::Connecting);
            let Some(store) = self.connect(&mut backoff).await else {
                break;
            };
            metrics().storage_connected.set(1);
            backoff.reset();

            loop {
                self.set_state(SupervisorState::Draining);
                match self.drain(store.as_ref(), &mut uploaded).await {
                    CycleEnd::Completed => backoff.reset(),
                    CycleEnd::Interrupted => break 'connect,
                    CycleEnd::CapabilityLost => {
                        metrics().storage_connected.set(0);
                        metrics().reconnects.inc();
                        let delay = backoff.next_delay();
                        warn!(
                            delay_secs = delay.as_secs_f64(),
                            "Remote storage lost, waiting before reconnect"
                        );
                        if !sleep_or_cancelled(delay, &self.shutdown).await {
                            break 'connect;
                        }
                        continue 'connect;
                    }
                }

                self.set_state(SupervisorState::Idle);
                if !sleep_or_cancelled(self.config.poll_interval(), &self.shutdown).await {
                    break 'connect;
                }
            }
        }

        metrics().storage_connected.set(0);
        self.set_state(SupervisorState::Stopped);

        let remaining = self.registry.snapshot();
        info!(uploaded, remaining = remaining.len(), "Upload supervisor stopped");
        ShutdownReport {
            uploaded,
            remaining,
        }
    }

    /// Acquires a store, retrying forever with the shared backoff. `None`
    /// means shutdown was requested.
    async fn connect(&self, backoff: &mut Backoff) -> Option<Arc<dyn ObjectStore>> {
        let connector = self.connector.as_ref();
        let result = retry_with_backoff(
            backoff,
            None,
            &self.shutdown,
            move |_| connector.connect(),
            |err: &StorageError, attempt| {
                error!(attempt, error = %err, "Remote storage not reachable, retrying");
                true
            },
        )
        .await;

        match result {
            Retry::Done { value, .. } => Some(value),
            Retry::Cancelled { .. } => {
                info!("Shutdown requested while connecting");
                None
            }
            // Unbounded attempts that always retry end only in success or
            // cancellation.
            Retry::Exhausted { .. } | Retry::Aborted { .. } => None,
        }
    }

    /// One drain cycle, bounded by the files closed when it started.
    async fn drain(&self, store: &dyn ObjectStore, uploaded: &mut usize) -> CycleEnd {
        let budget = self.registry.closed_count();
        if budget > 0 {
            debug!(budget, "Draining closed files");
        }

        for _ in 0..budget {
            if self.shutdown.is_cancelled() {
                return CycleEnd::Interrupted;
            }
            let Some(file) = self.registry.claim_next_closed() else {
                break;
            };

            let outcome = self.uploader.attempt_upload(store, &file.path).await;
            let end = match outcome {
                UploadOutcome::Success { .. } => {
                    self.registry.complete(&file.path, true);
                    *uploaded += 1;
                    None
                }
                UploadOutcome::Failure(failure) => match failure.reason {
                    FailureReason::CapabilityLost(_) => {
                        self.registry.complete(&file.path, false);
                        Some(CycleEnd::CapabilityLost)
                    }
                    FailureReason::Interrupted => {
                        self.registry.complete(&file.path, false);
                        Some(CycleEnd::Interrupted)
                    }
                    FailureReason::LocalFileMissing(_) if !file.path.exists() => {
                        warn!(path = %file.path.display(), "Local file is gone, giving up on it");
                        self.registry.fail(&file.path);
                        None
                    }
                    _ => {
                        self.registry.complete(&file.path, false);
                        None
                    }
                },
            };
            metrics().pending_files.set(self.registry.pending_count() as u64);

            if let Some(end) = end {
                return end;
            }
        }

        CycleEnd::Completed
    }

    fn set_state(&self, state: SupervisorState) {
        self.state.send_replace(state);
        debug!(state = %state, "Supervisor state");
    }
}
