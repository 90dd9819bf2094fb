//! Storage health checks.

use crate::client::FirebaseStore;
use tracing::{debug, warn};
use uploader_core::StorageError;

/// Verifies the bucket is reachable and the credentials are accepted.
///
/// Any failure is reported as unavailable: at this point there is no usable
/// capability yet.
pub async fn check_connection(store: &FirebaseStore) -> Result<(), StorageError> {
    match store.list_page(None, Some(1)).await {
        Ok(page) => {
            debug!(
                bucket = %store.bucket(),
                sample = page.items.len(),
                "Storage connection healthy"
            );
            Ok(())
        }
        Err(e) => {
            warn!(bucket = %store.bucket(), error = %e, "Storage health check failed");
            Err(StorageError::unavailable(e.message))
        }
    }
}
