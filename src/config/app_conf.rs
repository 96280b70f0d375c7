use std::env;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::config::{parse_env, ConfigError};

/// Where entities are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Mongo,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StorageBackend::Mongo),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::InvalidValue(format!("Unknown STORAGE_BACKEND: {}", other))),
        }
    }
}

/// How outbound email leaves the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailBackend {
    Smtp,
    /// Log messages instead of delivering them.
    Console,
}

impl FromStr for EmailBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smtp" => Ok(EmailBackend::Smtp),
            "console" => Ok(EmailBackend::Console),
            other => Err(ConfigError::InvalidValue(format!("Unknown EMAIL_BACKEND: {}", other))),
        }
    }
}

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub email: EmailBackend,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parse_env("APP_PORT", 8080u16)?;

        let storage = match env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => {
                warn!("STORAGE_BACKEND not set, defaulting to mongo");
                StorageBackend::Mongo
            }
        };
        debug!("Storage backend: {:?}", storage);

        let email = match env::var("EMAIL_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => {
                warn!("EMAIL_BACKEND not set, defaulting to smtp");
                EmailBackend::Smtp
            }
        };
        debug!("Email backend: {:?}", email);

        Ok(AppConfig { host, port, storage, email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_storage_backend() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!("MongoDB".parse::<StorageBackend>().unwrap(), StorageBackend::Mongo);
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_parse_email_backend() {
        assert_eq!(" console ".parse::<EmailBackend>().unwrap(), EmailBackend::Console);
        assert_eq!("smtp".parse::<EmailBackend>().unwrap(), EmailBackend::Smtp);
        assert!("sendmail".parse::<EmailBackend>().is_err());
    }
}
