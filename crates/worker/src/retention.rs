//! Retention sweep for remote recordings.
//!
//! Lists every remote object, picks recordings whose date prefix is older
//! than the retention window, and deletes them one by one. A failed delete is
//! recorded and the sweep moves on.

use chrono::{Local, NaiveDate};
use std::sync::Arc;
use storage::ObjectStore;
use telemetry::metrics;
use tracing::{debug, error, info, warn};
use uploader_core::naming::parse_date_prefix;
use uploader_core::{RetentionPolicy, StorageError};

/// A remote recording selected for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionCandidate {
    pub name: String,
    pub date: NaiveDate,
}

/// Outcome of one sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Objects returned by the listing
    pub listed: usize,
    /// Names selected for deletion
    pub candidates: Vec<String>,
    /// Names deleted
    pub deleted: Vec<String>,
    /// Names that could not be deleted, with the error
    pub failed: Vec<(String, StorageError)>,
}

impl SweepReport {
    /// True when every candidate was deleted.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_names(&self) -> Vec<&str> {
        self.failed.iter().map(|(name, _)| name.as_str()).collect()
    }
}

/// Deletes expired recordings from remote storage.
pub struct RetentionSweeper {
    store: Arc<dyn ObjectStore>,
    policy: RetentionPolicy,
    suffix: String,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn ObjectStore>, policy: RetentionPolicy, suffix: impl Into<String>) -> Self {
        Self {
            store,
            policy,
            suffix: suffix.into(),
        }
    }

    pub fn policy(&self) -> RetentionPolicy {
        self.policy
    }

    /// Selects the names that are expired as of `today`, in listing order.
    ///
    /// Names without the video suffix are skipped silently; names whose date
    /// prefix does not parse are skipped with a warning.
    pub fn candidates(&self, names: &[String], today: NaiveDate) -> Vec<RetentionCandidate> {
        names
            .iter()
            .filter(|name| name.ends_with(&self.suffix))
            .filter_map(|name| match parse_date_prefix(name) {
                Ok(date) => Some(RetentionCandidate {
                    name: name.clone(),
                    date,
                }),
                Err(e) => {
                    warn!(name = %name, error = %e, "Skipping remote file with unparsable date");
                    None
                }
            })
            .filter(|c| self.policy.is_expired(c.date, today))
            .collect()
    }

    /// Sweeps using the local calendar date.
    pub async fn run(&self) -> Result<SweepReport, StorageError> {
        self.run_for(Local::now().date_naive()).await
    }

    /// Sweeps as if today were `today`.
    pub async fn run_for(&self, today: NaiveDate) -> Result<SweepReport, StorageError> {
        info!(
            today = %today,
            retention_days = self.policy.days,
            cutoff = %self.policy.cutoff(today),
            "Running retention sweep"
        );

        let names = self.store.list().await.map_err(|e| {
            error!(error = %e, "Failed to list remote files");
            e
        })?;

        let candidates = self.candidates(&names, today);
        let mut report = SweepReport {
            listed: names.len(),
            candidates: candidates.iter().map(|c| c.name.clone()).collect(),
            ..Default::default()
        };

        if candidates.is_empty() {
            debug!(listed = names.len(), "Nothing to delete");
        }

        for candidate in candidates {
            match self.store.delete(&candidate.name).await {
                Ok(()) => {
                    metrics().remote_deletes.inc();
                    info!(name = %candidate.name, date = %candidate.date, "Deleted remote file");
                    report.deleted.push(candidate.name);
                }
                Err(e) => {
                    metrics().remote_delete_errors.inc();
                    error!(name = %candidate.name, error = %e, "Failed to delete remote file");
                    report.failed.push((candidate.name, e));
                }
            }
        }

        info!(
            listed = report.listed,
            deleted = report.deleted.len(),
            failed = report.failed.len(),
            "Retention sweep complete"
        );
        Ok(report)
    }
}
