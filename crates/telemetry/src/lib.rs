//! Internal telemetry for the video uploader.
//!
//! Structured logging via `tracing`, plus in-process counters that are
//! logged as a snapshot when the uploader shuts down.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::*;
pub use tracing_setup::*;
