use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Location of generated documents on local disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Shared root for every generated file
    pub media_root: PathBuf,
    /// Subdirectory of `media_root` holding quote PDFs
    pub quotes_dir: String,
    /// Subdirectory of `media_root` holding invoice PDFs
    pub invoices_dir: String,
}

impl MediaConfig {
    /// Load media configuration from environment variables
    ///
    /// Expected environment variables:
    /// - MEDIA_ROOT: root directory (defaults to "media")
    /// - QUOTES_DIR: quote subdirectory (defaults to "quotes")
    /// - INVOICES_DIR: invoice subdirectory (defaults to "invoices")
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading media configuration from environment variables");

        let media_root = env::var("MEDIA_ROOT").unwrap_or_else(|_| {
            warn!("MEDIA_ROOT not set, defaulting to ./media");
            "media".to_string()
        });
        debug!("Media root: {}", media_root);

        let quotes_dir = env::var("QUOTES_DIR").unwrap_or_else(|_| "quotes".to_string());
        debug!("Quotes directory: {}", quotes_dir);

        let invoices_dir = env::var("INVOICES_DIR").unwrap_or_else(|_| "invoices".to_string());
        debug!("Invoices directory: {}", invoices_dir);

        let config = MediaConfig {
            media_root: PathBuf::from(media_root),
            quotes_dir,
            invoices_dir,
        };

        config.validate()?;
        info!("Media configuration loaded successfully");
        Ok(config)
    }

    pub fn with_root(media_root: impl Into<PathBuf>) -> Self {
        MediaConfig {
            media_root: media_root.into(),
            ..MediaConfig::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.media_root.as_os_str().is_empty() {
            error!("Media root is empty");
            return Err(ConfigError::ValidationError("MEDIA_ROOT cannot be empty".to_string()));
        }

        for dir in [&self.quotes_dir, &self.invoices_dir] {
            if dir.is_empty() || dir.contains("..") || dir.starts_with('/') {
                error!("Invalid media subdirectory: {:?}", dir);
                return Err(ConfigError::ValidationError(format!(
                    "Media subdirectory must be a non-empty relative path: {:?}",
                    dir
                )));
            }
        }

        if self.quotes_dir == self.invoices_dir {
            error!("Quotes and invoices share a directory");
            return Err(ConfigError::ValidationError(
                "QUOTES_DIR and INVOICES_DIR must differ".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        MediaConfig {
            media_root: PathBuf::from("media"),
            quotes_dir: "quotes".to_string(),
            invoices_dir: "invoices".to_string(),
        }
    }
}
