//! In-memory registry of tracked video files.
//!
//! The registry is the only shared mutable state between event ingest and
//! the upload supervisor. Every operation takes the same lock, so a file can
//! never be claimed twice or observed half-updated.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use uploader_core::{normalize_path, FileState, TrackedFile};

struct Entry {
    file: TrackedFile,
    /// Queue position; lower is older. Bumped when a failed upload is
    /// requeued.
    seq: u64,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<PathBuf, Entry>,
    next_seq: u64,
}

impl Inner {
    fn bump(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

/// Table of tracked files keyed by normalized path.
#[derive(Default)]
pub struct FileRegistry {
    inner: Mutex<Inner>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a newly created file.
    ///
    /// Returns `false` if the path is already tracked; the existing entry is
    /// left untouched.
    pub fn insert(&self, path: &Path) -> bool {
        let key = normalize_path(path);
        let mut inner = self.inner.lock();

        if inner.entries.contains_key(&key) {
            debug!(path = %key.display(), "Already tracked");
            return false;
        }

        let seq = inner.bump();
        inner.entries.insert(
            key.clone(),
            Entry {
                file: TrackedFile::new(key),
                seq,
            },
        );
        true
    }

    /// Marks a created file as fully written.
    ///
    /// Unknown paths are ignored: the watcher may have started after the
    /// file was created. Returns whether a transition happened.
    pub fn mark_closed(&self, path: &Path) -> bool {
        let key = normalize_path(path);
        let mut inner = self.inner.lock();

        match inner.entries.get_mut(&key) {
            Some(entry) if entry.file.state == FileState::Created => {
                entry.file.state = FileState::Closed;
                true
            }
            Some(entry) => {
                debug!(path = %key.display(), state = %entry.file.state, "Ignoring close");
                false
            }
            None => {
                debug!(path = %key.display(), "Close for untracked file");
                false
            }
        }
    }

    /// Claims the oldest closed file for upload.
    pub fn claim_next_closed(&self) -> Option<TrackedFile> {
        let mut inner = self.inner.lock();

        let entry = inner
            .entries
            .values_mut()
            .filter(|e| e.file.state == FileState::Closed)
            .min_by_key(|e| e.seq)?;

        entry.file.state = FileState::Uploading;
        entry.file.attempts += 1;
        Some(entry.file.clone())
    }

    /// Records the result of an upload.
    ///
    /// Success removes the entry. Failure puts it back to `Closed` at the end
    /// of the queue. Only files in `Uploading` are affected.
    pub fn complete(&self, path: &Path, success: bool) -> bool {
        let key = normalize_path(path);
        let mut inner = self.inner.lock();

        let uploading = inner
            .entries
            .get(&key)
            .is_some_and(|e| e.file.state == FileState::Uploading);
        if !uploading {
            debug!(path = %key.display(), "Completion for file not being uploaded");
            return false;
        }

        if success {
            inner.entries.remove(&key);
        } else {
            let seq = inner.bump();
            if let Some(entry) = inner.entries.get_mut(&key) {
                entry.file.state = FileState::Closed;
                entry.seq = seq;
            }
        }
        true
    }

    /// Marks an uploading file as failed for good. It stays visible in
    /// snapshots but is never claimed again.
    pub fn fail(&self, path: &Path) -> bool {
        let key = normalize_path(path);
        let mut inner = self.inner.lock();

        match inner.entries.get_mut(&key) {
            Some(entry) if entry.file.state == FileState::Uploading => {
                entry.file.state = FileState::Failed;
                true
            }
            _ => false,
        }
    }

    /// Current record for a path.
    pub fn get(&self, path: &Path) -> Option<TrackedFile> {
        let key = normalize_path(path);
        self.inner.lock().entries.get(&key).map(|e| e.file.clone())
    }

    /// All records in queue order.
    pub fn snapshot(&self) -> Vec<TrackedFile> {
        let inner = self.inner.lock();
        let mut entries: Vec<&Entry> = inner.entries.values().collect();
        entries.sort_by_key(|e| e.seq);
        entries.into_iter().map(|e| e.file.clone()).collect()
    }

    pub fn closed_count(&self) -> usize {
        self.count_in(FileState::Closed)
    }

    /// Files that still need an upload (created, closed, or uploading).
    pub fn pending_count(&self) -> usize {
        self.inner
            .lock()
            .entries
            .values()
            .filter(|e| e.file.state.is_pending())
            .count()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn count_in(&self, state: FileState) -> usize {
        self.inner
            .lock()
            .entries
            .values()
            .filter(|e| e.file.state == state)
            .count()
    }
}
