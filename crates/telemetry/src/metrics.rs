//! Internal metrics collection.
//!
//! Collects pipeline counters in-memory; the binary logs a snapshot on
//! shutdown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// A gauge metric (can go up or down).
#[derive(Debug, Default)]
pub struct Gauge(AtomicU64);

impl Gauge {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn set(&self, val: u64) {
        self.0.store(val, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Histogram for upload latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 100ms, 250ms, 500ms, 1s, 2.5s, 5s, 10s, 30s, 60s, 120s, +inf
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [
        100,
        250,
        500,
        1_000,
        2_500,
        5_000,
        10_000,
        30_000,
        60_000,
        120_000,
        u64::MAX,
    ];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        let idx = Self::BUCKET_BOUNDS
            .iter()
            .position(|&bound| ms <= bound)
            .unwrap_or(Self::BUCKET_BOUNDS.len() - 1);
        self.buckets[idx].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the uploader.
#[derive(Debug, Default)]
pub struct Metrics {
    // Event ingest
    pub files_created: Counter,
    pub files_closed: Counter,
    pub events_ignored: Counter,

    // Uploads
    pub upload_attempts: Counter,
    pub upload_retries: Counter,
    pub uploads_succeeded: Counter,
    pub uploads_failed: Counter,
    pub upload_latency_ms: Histogram,

    // Storage connection
    pub reconnects: Counter,

    // Retention
    pub remote_deletes: Counter,
    pub remote_delete_errors: Counter,

    // Gauges
    pub pending_files: Gauge,
    pub storage_connected: Gauge,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            files_created: self.files_created.get(),
            files_closed: self.files_closed.get(),
            events_ignored: self.events_ignored.get(),
            upload_attempts: self.upload_attempts.get(),
            upload_retries: self.upload_retries.get(),
            uploads_succeeded: self.uploads_succeeded.get(),
            uploads_failed: self.uploads_failed.get(),
            upload_latency_mean_ms: self.upload_latency_ms.mean(),
            reconnects: self.reconnects.get(),
            remote_deletes: self.remote_deletes.get(),
            remote_delete_errors: self.remote_delete_errors.get(),
            pending_files: self.pending_files.get(),
            storage_connected: self.storage_connected.get() > 0,
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub files_created: u64,
    pub files_closed: u64,
    pub events_ignored: u64,
    pub upload_attempts: u64,
    pub upload_retries: u64,
    pub uploads_succeeded: u64,
    pub uploads_failed: u64,
    pub upload_latency_mean_ms: f64,
    pub reconnects: u64,
    pub remote_deletes: u64,
    pub remote_delete_errors: u64,
    pub pending_files: u64,
    pub storage_connected: bool,
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
