//! Simplified filesystem events.

use notify::event::{AccessKind, AccessMode};
use notify::{Event, EventKind};
use std::path::PathBuf;

/// Kind of a filesystem event relevant to the uploader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsEventKind {
    /// A file appeared in the watched directory.
    Created,
    /// A file opened for writing was closed.
    Closed,
    /// Anything else; kept for diagnostics only.
    Other(String),
}

/// One filesystem event for one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    pub kind: FsEventKind,
    pub path: PathBuf,
}

impl FsEvent {
    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: FsEventKind::Created,
            path: path.into(),
        }
    }

    pub fn closed(path: impl Into<PathBuf>) -> Self {
        Self {
            kind: FsEventKind::Closed,
            path: path.into(),
        }
    }

    pub fn other(path: impl Into<PathBuf>, kind: impl Into<String>) -> Self {
        Self {
            kind: FsEventKind::Other(kind.into()),
            path: path.into(),
        }
    }
}

/// Converts a `notify` event into one [`FsEvent`] per affected path.
pub fn from_notify(event: Event) -> Vec<FsEvent> {
    let kind = match event.kind {
        EventKind::Create(_) => FsEventKind::Created,
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => FsEventKind::Closed,
        other => FsEventKind::Other(format!("{:?}", other)),
    };

    event
        .paths
        .into_iter()
        .map(|path| FsEvent {
            kind: kind.clone(),
            path,
        })
        .collect()
}
