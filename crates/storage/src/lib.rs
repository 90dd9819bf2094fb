//! Remote object storage for the video uploader.
//!
//! The pipeline only sees the [`ObjectStore`] and [`StoreConnector`] traits;
//! the Firebase Storage REST backend is the production implementation.

pub mod client;
pub mod config;
pub mod connector;
pub mod health;
pub mod store;

pub use client::FirebaseStore;
pub use config::*;
pub use connector::FirebaseConnector;
pub use store::*;
