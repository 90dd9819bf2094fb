//! Manual upload of one day's recordings from a local directory.

use crate::upload::{UploadOutcome, UploadWorker};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use storage::ObjectStore;
use tracing::{debug, info, warn};
use uploader_core::naming::is_recording_of;
use uploader_core::Result;

/// Regular files in `dir` recorded on `date`, sorted by name.
pub fn files_for_date(dir: &Path, date: NaiveDate, suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| is_recording_of(n, date, suffix));
        if matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Result of a backfill run.
#[derive(Debug, Default)]
pub struct BackfillResult {
    pub uploaded: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

impl BackfillResult {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Uploads every recording of a given day with the regular retry policy.
pub struct BackfillWorker {
    uploader: UploadWorker,
    suffix: String,
}

impl BackfillWorker {
    pub fn new(uploader: UploadWorker, suffix: impl Into<String>) -> Self {
        Self {
            uploader,
            suffix: suffix.into(),
        }
    }

    pub async fn run(&self, store: &dyn ObjectStore, dir: &Path, date: NaiveDate) -> Result<BackfillResult> {
        let files = files_for_date(dir, date, &self.suffix)?;
        info!(dir = %dir.display(), date = %date, files = files.len(), "Running backfill");

        let mut result = BackfillResult::default();
        for path in files {
            match self.uploader.attempt_upload(store, &path).await {
                UploadOutcome::Success { .. } => result.uploaded.push(path),
                UploadOutcome::Failure(failure) => {
                    warn!(path = %path.display(), reason = %failure.reason, "Backfill upload failed");
                    result.failed.push(path);
                }
            }
        }

        debug!(uploaded = result.uploaded.len(), failed = result.failed.len(), "Backfill complete");
        Ok(result)
    }
}
