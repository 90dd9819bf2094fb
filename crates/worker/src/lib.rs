//! Upload pipeline workers.
//!
//! - Registry (tracked files and their upload state)
//! - Ingest (filesystem events → registry transitions)
//! - Upload (bounded retry of one file)
//! - Supervisor (connect, drain, idle, reconnect)
//! - Retention (remote cleanup of old recordings)
//! - Backfill (manual upload of one day's recordings)

pub mod backfill;
pub mod backoff;
pub mod ingest;
pub mod pipeline;
pub mod registry;
pub mod retention;
pub mod supervisor;
pub mod upload;

pub use backfill::{BackfillResult, BackfillWorker};
pub use backoff::{retry_with_backoff, sleep_or_cancelled, Backoff, Retry};
pub use ingest::{EventIngest, IngestAction};
pub use pipeline::*;
pub use registry::FileRegistry;
pub use retention::{RetentionCandidate, RetentionSweeper, SweepReport};
pub use supervisor::*;
pub use upload::*;
