//! Shared helpers for the uploader integration tests.

pub mod fixtures;
pub mod mocks;

pub use mocks::{MockConnector, MockStore};
