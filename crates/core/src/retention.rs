//! Retention policy for remote recordings.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Days a remote recording is kept by default.
pub const DEFAULT_RETENTION_DAYS: u32 = 5;

/// Retention window for remote recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            days: DEFAULT_RETENTION_DAYS,
        }
    }
}

impl RetentionPolicy {
    pub fn new(days: u32) -> Self {
        Self { days }
    }

    fn window(&self) -> Duration {
        Duration::days(i64::from(self.days))
    }

    /// Oldest timestamp that is still kept: `today 00:00 - days`.
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDateTime {
        midnight(today) - self.window()
    }

    /// A recording is expired when it is strictly older than the window.
    /// One made exactly `days` before today is kept.
    pub fn is_expired(&self, recorded: NaiveDate, today: NaiveDate) -> bool {
        midnight(today) - midnight(recorded) > self.window()
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_default()
}
