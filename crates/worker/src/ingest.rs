//! Applies filesystem events to the file registry.

use crate::registry::FileRegistry;
use std::sync::Arc;
use telemetry::metrics;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};
use uploader_core::naming::has_video_suffix;
use watcher::{FsEvent, FsEventKind};

/// What an event did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestAction {
    Queued,
    Closed,
    /// Duplicate create, close for an untracked file, or close in the wrong
    /// state.
    Unchanged,
    /// Not a video file, or not a create/close event.
    Ignored,
}

/// Turns `created`/`closed` notifications into registry transitions.
#[derive(Clone)]
pub struct EventIngest {
    registry: Arc<FileRegistry>,
    suffix: String,
}

impl EventIngest {
    pub fn new(registry: Arc<FileRegistry>, suffix: impl Into<String>) -> Self {
        Self {
            registry,
            suffix: suffix.into(),
        }
    }

    /// Applies one event.
    pub fn handle(&self, event: &FsEvent) -> IngestAction {
        if let FsEventKind::Other(kind) = &event.kind {
            trace!(kind = %kind, path = %event.path.display(), "Filesystem event");
            return IngestAction::Ignored;
        }

        if !has_video_suffix(&event.path, &self.suffix) {
            metrics().events_ignored.inc();
            return IngestAction::Ignored;
        }

        match event.kind {
            FsEventKind::Created => {
                if self.registry.insert(&event.path) {
                    metrics().files_created.inc();
                    metrics()
                        .pending_files
                        .set(self.registry.pending_count() as u64);
                    info!(path = %event.path.display(), "Video file queued for uploading");
                    IngestAction::Queued
                } else {
                    IngestAction::Unchanged
                }
            }
            FsEventKind::Closed => {
                if self.registry.mark_closed(&event.path) {
                    metrics().files_closed.inc();
                    debug!(path = %event.path.display(), "Video file closed");
                    IngestAction::Closed
                } else {
                    IngestAction::Unchanged
                }
            }
            FsEventKind::Other(_) => IngestAction::Ignored,
        }
    }

    /// Consumes events until the channel closes.
    pub async fn run(self, mut events: mpsc::UnboundedReceiver<FsEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(&event);
        }
        debug!("Event ingest stopped");
    }

    /// Runs [`EventIngest::run`] on its own task.
    pub fn spawn(self, events: mpsc::UnboundedReceiver<FsEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }
}
