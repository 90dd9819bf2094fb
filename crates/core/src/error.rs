//! Unified error types for the video uploader.
//!
//! Storage failures carry an [`ErrorClass`] so callers can decide between
//! retrying, reconnecting, or giving up on a single file.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// How a storage failure should be treated by the upload pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Connectivity loss, timeouts, throttling, server-side hiccups.
    Transient,
    /// The request itself was rejected (bad object name, quota, ...).
    Permanent,
    /// The storage capability is unusable as a whole (unreachable at
    /// acquisition, credentials rejected). Requires a reconnect.
    Unavailable,
    /// The local file could not be read.
    LocalFile,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
            Self::Unavailable => "unavailable",
            Self::LocalFile => "local_file",
        }
    }
}

impl std::fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported by a storage capability.
#[derive(Debug, Clone, Error)]
#[error("[{class}] {message}")]
pub struct StorageError {
    pub class: ErrorClass,
    pub message: String,
}

impl StorageError {
    pub fn new(class: ErrorClass, msg: impl Into<String>) -> Self {
        Self {
            class,
            message: msg.into(),
        }
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Self::new(ErrorClass::Transient, msg)
    }

    pub fn permanent(msg: impl Into<String>) -> Self {
        Self::new(ErrorClass::Permanent, msg)
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unavailable, msg)
    }

    pub fn local_file(msg: impl Into<String>) -> Self {
        Self::new(ErrorClass::LocalFile, msg)
    }

    pub fn class(&self) -> ErrorClass {
        self.class
    }

    pub fn is_transient(&self) -> bool {
        self.class == ErrorClass::Transient
    }

    /// Whether the capability that produced this error must be reacquired.
    pub fn is_capability_lost(&self) -> bool {
        self.class == ErrorClass::Unavailable
    }
}

/// Unified error type for the video uploader.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("watch error: {0}")]
    Watch(String),
}

impl Error {
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    pub fn watch(msg: impl Into<String>) -> Self {
        Self::Watch(msg.into())
    }
}
