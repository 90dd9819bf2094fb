//! Storage configuration and credentials.

use serde::{Deserialize, Serialize};
use std::path::Path;
use uploader_core::StorageError;

/// Firebase Storage connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage REST endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Credentials file name inside the credentials directory
    #[serde(default = "default_credentials_file")]
    pub credentials_file: String,
    /// Content type sent with uploads
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_base_url() -> String {
    "https://firebasestorage.googleapis.com".to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_credentials_file() -> String {
    "firebase.json".to_string()
}

fn default_content_type() -> String {
    "video/mp4".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            credentials_file: default_credentials_file(),
            content_type: default_content_type(),
        }
    }
}

/// Opaque credentials read from the credentials directory.
///
/// Only the bucket is required. The access token, when present, is sent as a
/// bearer token; other keys of the Firebase web config are ignored.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub storage_bucket: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("storage_bucket", &self.storage_bucket)
            .field("access_token", &self.access_token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Credentials {
    /// Reads `<dir>/<file_name>`.
    pub async fn load(dir: &Path, file_name: &str) -> Result<Self, StorageError> {
        let path = dir.join(file_name);
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            StorageError::unavailable(format!("cannot read {}: {}", path.display(), e))
        })?;

        let creds: Credentials = serde_json::from_str(&raw).map_err(|e| {
            StorageError::unavailable(format!("invalid credentials {}: {}", path.display(), e))
        })?;

        if creds.storage_bucket.trim().is_empty() {
            return Err(StorageError::unavailable(format!(
                "{}: storageBucket is empty",
                path.display()
            )));
        }

        Ok(creds)
    }
}
