//! Camera video uploader.
//!
//! Shared configuration and command-line helpers for the `video-uploader`,
//! `remove-old-videos` and `upload-backfill` binaries.

pub mod cli;
pub mod settings;

pub use settings::{load_config, AppConfig};
