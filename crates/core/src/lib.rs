//! Core types, naming convention, and retention policy for the video uploader.

pub mod error;
pub mod file;
pub mod naming;
pub mod retention;

pub use error::{Error, ErrorClass, Result, StorageError};
pub use file::*;
pub use retention::*;
