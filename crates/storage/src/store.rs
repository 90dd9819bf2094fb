//! Storage capability traits.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use uploader_core::StorageError;

/// A remote object store holding uploaded recordings.
///
/// Implemented by [`crate::FirebaseStore`] in production and by in-memory
/// mocks in tests.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads a local file. The object is named after the file name.
    /// Returns the remote object name.
    async fn put(&self, local_path: &Path) -> Result<String, StorageError>;

    /// Deletes a remote object.
    async fn delete(&self, remote_name: &str) -> Result<(), StorageError>;

    /// Lists all remote object names.
    async fn list(&self) -> Result<Vec<String>, StorageError>;
}

/// Acquires a validated [`ObjectStore`].
///
/// Acquisition failures are reported with
/// [`uploader_core::ErrorClass::Unavailable`] so they can be told apart from
/// per-object errors.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ObjectStore>, StorageError>;
}
