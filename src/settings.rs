//! Layered application configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use storage::StorageConfig;
use uploader_core::naming::DEFAULT_VIDEO_SUFFIX;
use uploader_core::RetentionPolicy;
use worker::{PipelineConfig, SupervisorConfig, UploadConfig};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config/uploader";

/// Environment variable prefix, e.g. `UPLOADER__UPLOAD__MAX_ATTEMPTS=5`.
pub const ENV_PREFIX: &str = "UPLOADER";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// File name suffix of recordings to upload
    #[serde(default = "default_video_suffix")]
    pub video_suffix: String,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub supervisor: SupervisorConfig,

    #[serde(default)]
    pub retention: RetentionPolicy,

    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_video_suffix() -> String {
    DEFAULT_VIDEO_SUFFIX.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            video_suffix: default_video_suffix(),
            upload: UploadConfig::default(),
            supervisor: SupervisorConfig::default(),
            retention: RetentionPolicy::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            video_suffix: self.video_suffix.clone(),
            upload: self.upload.clone(),
            supervisor: self.supervisor.clone(),
        }
    }
}

/// Loads configuration: defaults, then the config file, then `UPLOADER__*`
/// environment variables.
///
/// `file` replaces the default config file location; an explicit file must
/// exist.
pub fn load_config(file: Option<&Path>) -> Result<AppConfig> {
    let file_source = match file {
        Some(path) => ::config::File::from(path).required(true),
        None => ::config::File::with_name(DEFAULT_CONFIG_FILE)
            .required(false)
            .format(::config::FileFormat::Toml),
    };

    let config = ::config::Config::builder()
        .add_source(::config::Config::try_from(&AppConfig::default())?)
        .add_source(file_source)
        .add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let config: AppConfig = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    if config.video_suffix.is_empty() {
        anyhow::bail!("video_suffix must not be empty");
    }

    Ok(config)
}
