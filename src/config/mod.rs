pub mod app_conf;
pub mod email_conf;
pub mod lifecycle_conf;
pub mod media_conf;
pub mod mongo_conf;

pub use app_conf::{AppConfig, EmailBackend, StorageBackend};
pub use email_conf::EmailConfig;
pub use lifecycle_conf::{InvoiceEmailPolicy, LifecycleConfig};
pub use media_conf::MediaConfig;
pub use mongo_conf::MongoConfig;

use std::env;
use std::str::FromStr;
use tracing::{error, warn};

/// Common configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

pub(crate) fn require_env(name: &str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| {
        error!("{} environment variable not found", name);
        ConfigError::EnvVarNotFound(name.to_string())
    })
}

/// Parses `name` when set, otherwise returns `default`. A set but malformed value is an error.
pub(crate) fn parse_env<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| {
            error!("Invalid {} value: {}", name, raw);
            ConfigError::ParseError(format!("Invalid {} value: {}", name, raw))
        }),
        Err(_) => {
            warn!("{} not set, using default", name);
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_and_error() {
        std::env::remove_var("FIELDWORKS_TEST_UNSET");
        assert_eq!(parse_env("FIELDWORKS_TEST_UNSET", 7u16).unwrap(), 7);

        std::env::set_var("FIELDWORKS_TEST_PORT", "not-a-port");
        assert!(matches!(
            parse_env::<u16>("FIELDWORKS_TEST_PORT", 1),
            Err(ConfigError::ParseError(_))
        ));
        std::env::set_var("FIELDWORKS_TEST_PORT", " 2525 ");
        assert_eq!(parse_env::<u16>("FIELDWORKS_TEST_PORT", 1).unwrap(), 2525);
    }

    #[test]
    fn test_require_env_reports_name() {
        std::env::remove_var("FIELDWORKS_TEST_MISSING");
        let err = require_env("FIELDWORKS_TEST_MISSING").unwrap_err();
        assert_eq!(err.to_string(), "Environment variable not found: FIELDWORKS_TEST_MISSING");
    }
}
