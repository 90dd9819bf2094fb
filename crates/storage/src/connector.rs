//! Acquisition of a validated Firebase store.

use crate::client::FirebaseStore;
use crate::config::{Credentials, StorageConfig};
use crate::health::check_connection;
use crate::store::{ObjectStore, StoreConnector};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use uploader_core::StorageError;

/// Builds [`FirebaseStore`]s from the credentials directory.
///
/// Credentials are re-read on every connect, so a replaced token file takes
/// effect on the next reconnect without restarting the uploader.
#[derive(Debug, Clone)]
pub struct FirebaseConnector {
    config: StorageConfig,
    credentials_dir: PathBuf,
}

impl FirebaseConnector {
    pub fn new(config: StorageConfig, credentials_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            credentials_dir: credentials_dir.into(),
        }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

#[async_trait]
impl StoreConnector for FirebaseConnector {
    async fn connect(&self) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let credentials =
            Credentials::load(&self.credentials_dir, &self.config.credentials_file).await?;
        let store = FirebaseStore::new(&self.config, credentials)?;

        check_connection(&store).await?;

        info!(bucket = %store.bucket(), "Connected to storage");
        Ok(Arc::new(store))
    }
}
