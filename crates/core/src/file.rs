//! Tracked video file records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Lifecycle state of a video file under observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    /// The recorder created the file and is still writing it.
    Created,
    /// Fully written; waiting for upload.
    Closed,
    /// Claimed by the upload worker.
    Uploading,
    /// Stored remotely. Terminal.
    Uploaded,
    /// The local file vanished before it could be uploaded.
    Failed,
}

impl FileState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Closed => "closed",
            Self::Uploading => "uploading",
            Self::Uploaded => "uploaded",
            Self::Failed => "failed",
        }
    }

    /// Whether the file still needs an upload.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Created | Self::Closed | Self::Uploading)
    }
}

impl std::fmt::Display for FileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One video file and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedFile {
    pub path: PathBuf,
    pub state: FileState,
    /// Upload attempts made so far, across drain cycles.
    pub attempts: u32,
    pub queued_at: DateTime<Utc>,
}

impl TrackedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: FileState::Created,
            attempts: 0,
            queued_at: Utc::now(),
        }
    }

    /// File name component, used as the remote object name.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Normalizes a path into the key used by the registry.
///
/// Existing files are canonicalized so symlinks and relative spellings of the
/// same file collapse to one key. Paths that no longer exist fall back to a
/// lexical cleanup of `.` and `..` components.
///
/// Blocks on a single `canonicalize` metadata lookup, also when called from
/// async tasks. The registry calls it before taking its lock.
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = std::fs::canonicalize(path) {
        return canonical;
    }

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
