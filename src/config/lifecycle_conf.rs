use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::{debug, error, info, warn};

use crate::config::ConfigError;

/// Whether a completed quote re-sends its invoice on every save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceEmailPolicy {
    /// Send automatically only while the invoice is not marked as sent.
    Once,
    /// Send on every save of a completed quote with line items.
    EverySave,
}

impl FromStr for InvoiceEmailPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(InvoiceEmailPolicy::Once),
            "every_save" | "every-save" => Ok(InvoiceEmailPolicy::EverySave),
            other => Err(ConfigError::InvalidValue(format!("Unknown INVOICE_EMAIL_POLICY: {}", other))),
        }
    }
}

/// Settings for the quote/invoice lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    pub quote_id_prefix: String,
    pub invoice_id_prefix: String,
    pub invoice_email_policy: InvoiceEmailPolicy,
    /// Printed on documents when no company record exists
    pub company_name: String,
}

impl LifecycleConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading lifecycle configuration from environment variables");

        let quote_id_prefix = env::var("QUOTE_ID_PREFIX").unwrap_or_else(|_| "fwz-".to_string());
        debug!("Quote id prefix: {}", quote_id_prefix);

        let invoice_id_prefix = env::var("INVOICE_ID_PREFIX").unwrap_or_else(|_| "fwz-inv-".to_string());
        debug!("Invoice id prefix: {}", invoice_id_prefix);

        let invoice_email_policy = match env::var("INVOICE_EMAIL_POLICY") {
            Ok(value) => value.parse().map_err(|e| {
                error!("Invalid INVOICE_EMAIL_POLICY value");
                e
            })?,
            Err(_) => {
                warn!("INVOICE_EMAIL_POLICY not set, defaulting to once");
                InvoiceEmailPolicy::Once
            }
        };
        debug!("Invoice email policy: {:?}", invoice_email_policy);

        let company_name = env::var("COMPANY_NAME").unwrap_or_else(|_| "Fieldworks".to_string());

        let config = LifecycleConfig {
            quote_id_prefix,
            invoice_id_prefix,
            invoice_email_policy,
            company_name,
        };
        config.validate()?;
        info!("Lifecycle configuration loaded successfully");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.quote_id_prefix.is_empty() || self.invoice_id_prefix.is_empty() {
            error!("Identifier prefix is empty");
            return Err(ConfigError::ValidationError("Identifier prefixes cannot be empty".to_string()));
        }
        if self.quote_id_prefix == self.invoice_id_prefix {
            error!("Quote and invoice prefixes are identical");
            return Err(ConfigError::ValidationError(
                "QUOTE_ID_PREFIX and INVOICE_ID_PREFIX must differ".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        LifecycleConfig {
            quote_id_prefix: "fwz-".to_string(),
            invoice_id_prefix: "fwz-inv-".to_string(),
            invoice_email_policy: InvoiceEmailPolicy::Once,
            company_name: "Fieldworks".to_string(),
        }
    }
}
