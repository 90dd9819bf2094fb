//! Filesystem event source for the video uploader.
//!
//! Wraps a non-recursive `notify` watcher and forwards simplified
//! [`FsEvent`]s over a channel. The watcher callback never blocks.

pub mod event;
pub mod source;

pub use event::*;
pub use source::*;
