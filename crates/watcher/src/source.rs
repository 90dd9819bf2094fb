//! Directory watcher backed by `notify`.

use crate::event::{from_notify, FsEvent};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{error, info, trace};
use uploader_core::{Error, Result};

/// Watches one directory (non-recursively) and forwards events to a channel.
///
/// Dropping the watcher, or calling [`DirectoryWatcher::stop`], stops the
/// notifications and closes the channel once the last sender is gone.
pub struct DirectoryWatcher {
    inner: RecommendedWatcher,
    dir: PathBuf,
}

impl DirectoryWatcher {
    /// Starts watching `dir`. Returns the watcher and the receiving end of
    /// the event channel.
    pub fn start(dir: &Path) -> Result<(Self, mpsc::UnboundedReceiver<FsEvent>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let watcher = Self::with_sender(dir, tx)?;
        Ok((watcher, rx))
    }

    /// Starts watching `dir`, sending events into an existing channel.
    pub fn with_sender(dir: &Path, tx: mpsc::UnboundedSender<FsEvent>) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::NotADirectory(dir.to_path_buf()));
        }

        let mut inner = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for fs_event in from_notify(event) {
                        trace!(kind = ?fs_event.kind, path = %fs_event.path.display(), "Raw fs event");
                        if tx.send(fs_event).is_err() {
                            // Receiver gone: the uploader is shutting down.
                            return;
                        }
                    }
                }
                Err(e) => error!("Watch error: {}", e),
            },
            Config::default(),
        )
        .map_err(|e| Error::watch(format!("failed to create watcher: {}", e)))?;

        inner
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| Error::watch(format!("failed to watch {}: {}", dir.display(), e)))?;

        info!(dir = %dir.display(), "Monitoring directory for new video files");

        Ok(Self {
            inner,
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stops watching and releases the event channel sender.
    pub fn stop(mut self) {
        if let Err(e) = self.inner.unwatch(&self.dir) {
            error!(dir = %self.dir.display(), "Failed to unwatch directory: {}", e);
        }
        info!(dir = %self.dir.display(), "Stopped directory watcher");
    }
}
