use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info};

use crate::config::{parse_env, require_env, ConfigError};

/// Connection settings for the MongoDB storage backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Reported to the server in connection metadata
    pub app_name: String,
    pub pool_size: u32,
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// Reads `MONGO_URI` and `MONGO_DATABASE` (required), `MONGO_USERNAME`/`MONGO_PASSWORD`,
    /// `MONGO_POOL_SIZE` and `MONGO_CONNECTION_TIMEOUT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MongoDB configuration from environment variables");
        let defaults = MongoConfig::default();

        let config = MongoConfig {
            uri: require_env("MONGO_URI")?,
            database: require_env("MONGO_DATABASE")?,
            username: env::var("MONGO_USERNAME").ok(),
            password: env::var("MONGO_PASSWORD").ok(),
            app_name: env::var("MONGO_APP_NAME").unwrap_or(defaults.app_name),
            pool_size: parse_env("MONGO_POOL_SIZE", defaults.pool_size)?,
            connection_timeout_secs: parse_env("MONGO_CONNECTION_TIMEOUT", defaults.connection_timeout_secs)?,
        };
        debug!(
            database = %config.database,
            authenticated = config.username.is_some(),
            pool_size = config.pool_size,
            "MongoDB settings"
        );

        config.validate()?;
        info!("MongoDB configuration loaded successfully");
        Ok(config)
    }

    pub fn from_test_env() -> Self {
        MongoConfig {
            database: "fieldworks_test".to_string(),
            app_name: "FieldworksBackendTest".to_string(),
            pool_size: 2,
            connection_timeout_secs: 2,
            ..MongoConfig::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let problem = if self.uri.trim().is_empty() {
            Some("MongoDB URI cannot be empty")
        } else if self.database.trim().is_empty() {
            Some("MongoDB database cannot be empty")
        } else if self.pool_size == 0 {
            Some("MongoDB pool size must be greater than 0")
        } else if self.connection_timeout_secs == 0 {
            Some("MongoDB connection timeout must be greater than 0")
        } else if self.username.is_some() != self.password.is_some() {
            Some("MONGO_USERNAME and MONGO_PASSWORD must be set together")
        } else if self.username.as_deref() == Some("") {
            Some("MongoDB username cannot be empty if set")
        } else {
            None
        };

        match problem {
            Some(message) => {
                error!("{}", message);
                Err(ConfigError::ValidationError(message.to_string()))
            }
            None => Ok(()),
        }
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "fieldworks".to_string(),
            username: None,
            password: None,
            app_name: "FieldworksBackend".to_string(),
            pool_size: 10,
            connection_timeout_secs: 5,
        }
    }
}
