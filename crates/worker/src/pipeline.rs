//! Wires event ingest and the upload supervisor onto tokio tasks.

use crate::ingest::EventIngest;
use crate::registry::FileRegistry;
use crate::supervisor::{PipelineSupervisor, ShutdownReport, SupervisorConfig, SupervisorState};
use crate::upload::UploadConfig;
use std::sync::Arc;
use storage::StoreConnector;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uploader_core::naming::DEFAULT_VIDEO_SUFFIX;
use watcher::FsEvent;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub video_suffix: String,
    pub upload: UploadConfig,
    pub supervisor: SupervisorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            video_suffix: DEFAULT_VIDEO_SUFFIX.to_string(),
            upload: UploadConfig::default(),
            supervisor: SupervisorConfig::default(),
        }
    }
}

/// Handles to the running pipeline tasks.
pub struct PipelineHandles {
    pub ingest: JoinHandle<()>,
    pub supervisor: JoinHandle<ShutdownReport>,
    pub state: watch::Receiver<SupervisorState>,
}

/// Uploader pipeline: one shared registry, one ingest task, one supervisor.
pub struct Pipeline {
    config: PipelineConfig,
    registry: Arc<FileRegistry>,
    connector: Arc<dyn StoreConnector>,
    shutdown: CancellationToken,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        connector: Arc<dyn StoreConnector>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            registry: Arc::new(FileRegistry::new()),
            connector,
            shutdown,
        }
    }

    pub fn registry(&self) -> Arc<FileRegistry> {
        self.registry.clone()
    }

    /// Starts both tasks. The ingest task ends when the event channel
    /// closes; the supervisor ends when the shutdown token fires.
    pub fn start(self, events: mpsc::UnboundedReceiver<FsEvent>) -> PipelineHandles {
        let ingest = EventIngest::new(self.registry.clone(), self.config.video_suffix.clone())
            .spawn(events);

        let supervisor = PipelineSupervisor::new(
            self.registry,
            self.connector,
            self.config.upload,
            self.config.supervisor,
            self.shutdown,
        );
        let state = supervisor.subscribe();
        let supervisor = tokio::spawn(supervisor.run());

        info!("Upload pipeline started");
        PipelineHandles {
            ingest,
            supervisor,
            state,
        }
    }
}
