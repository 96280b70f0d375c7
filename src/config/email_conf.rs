use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info};

use crate::config::{parse_env, require_env, ConfigError};

/// SMTP settings plus the sender identity used on every outbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Empty for relays without authentication
    pub smtp_username: String,
    pub smtp_password: String,
    /// Implicit TLS, or STARTTLS when `use_starttls` is also set
    pub use_tls: bool,
    pub use_starttls: bool,
    pub from_email: String,
    pub from_name: String,
    pub connection_timeout_secs: u64,
}

impl EmailConfig {
    /// Reads `SMTP_HOST` and `SMTP_FROM_EMAIL` (required) and the optional `SMTP_*` settings.
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading email configuration from environment variables");
        let defaults = EmailConfig::default();

        let config = EmailConfig {
            smtp_host: require_env("SMTP_HOST")?,
            smtp_port: parse_env("SMTP_PORT", defaults.smtp_port)?,
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            use_tls: parse_env("SMTP_USE_TLS", defaults.use_tls)?,
            use_starttls: parse_env("SMTP_USE_STARTTLS", defaults.use_starttls)?,
            from_email: require_env("SMTP_FROM_EMAIL")?,
            from_name: env::var("SMTP_FROM_NAME").unwrap_or(defaults.from_name),
            connection_timeout_secs: parse_env("SMTP_CONNECTION_TIMEOUT", defaults.connection_timeout_secs)?,
        };
        debug!(
            host = %config.smtp_host,
            port = config.smtp_port,
            tls = config.use_tls,
            starttls = config.use_starttls,
            sender = %config.sender(),
            "SMTP settings"
        );

        config.validate()?;
        info!("Email configuration loaded successfully");
        Ok(config)
    }

    /// Local catcher such as MailHog on port 1025.
    pub fn from_test_env() -> Self {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: "test".to_string(),
            smtp_password: "test".to_string(),
            use_tls: false,
            use_starttls: false,
            from_email: "test@example.com".to_string(),
            from_name: "Test App".to_string(),
            connection_timeout_secs: 10,
        }
    }

    /// Sender-only configuration for backends that never open an SMTP connection.
    /// SMTP_FROM_EMAIL and SMTP_FROM_NAME are honoured when present.
    pub fn sender_from_env() -> Self {
        let mut config = EmailConfig::default();
        if let Ok(from_email) = env::var("SMTP_FROM_EMAIL") {
            config.from_email = from_email;
        }
        if let Ok(from_name) = env::var("SMTP_FROM_NAME") {
            config.from_name = from_name;
        }
        debug!("Sender: {}", config.sender());
        config
    }

    /// Formatted sender mailbox, e.g. `Fieldworks <noreply@example.com>`
    pub fn sender(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let problem = if self.smtp_host.trim().is_empty() {
            Some("SMTP host cannot be empty")
        } else if self.smtp_port == 0 {
            Some("SMTP port cannot be 0")
        } else if !self.smtp_username.is_empty() && self.smtp_password.is_empty() {
            Some("SMTP password is required when SMTP_USERNAME is set")
        } else if self.from_email.is_empty() {
            Some("From email cannot be empty")
        } else if !self.from_email.contains('@') {
            Some("Invalid from email format")
        } else if self.connection_timeout_secs == 0 {
            Some("Connection timeout cannot be 0")
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

    pub fn get_smtp_url(&self) -> String {
        format!("{}:{}", self.smtp_host, self.smtp_port)
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            use_tls: true,
            use_starttls: true,
            from_email: "noreply@example.com".to_string(),
            from_name: "Fieldworks".to_string(),
            connection_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sender() {
        let config = EmailConfig::default();
        assert_eq!(config.sender(), "Fieldworks <noreply@example.com>");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unauthenticated_relay_is_valid() {
        let mut config = EmailConfig::from_test_env();
        config.smtp_username = String::new();
        config.smtp_password = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_username_without_password_is_invalid() {
        let mut config = EmailConfig::from_test_env();
        config.smtp_password = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_sender_and_timeout() {
        let mut config = EmailConfig::from_test_env();
        config.from_email = "invalid-email".to_string();
        assert!(config.validate().is_err());

        let mut config = EmailConfig::from_test_env();
        config.connection_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
