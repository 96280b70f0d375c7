use crate::config::{EmailConfig, ConfigError};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

/// Email service errors
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("SMTP error: {0}")]
    SmtpError(String),

    #[error("Message building error: {0}")]
    MessageError(String),

    #[error("Address error: {0}")]
    AddressError(String),

    #[error("Attachment error: {0}")]
    AttachmentError(String),
}

impl From<ConfigError> for EmailError {
    fn from(err: ConfigError) -> Self {
        EmailError::ConfigError(err.to_string())
    }
}

/// Email message builder
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: Option<String>,
    pub html_body: Option<String>,
    /// Local file attached to the message. A missing file is skipped.
    pub attachment: Option<PathBuf>,
}

impl EmailMessage {
    pub fn new(to: String, subject: String) -> Self {
        Self {
            to,
            subject,
            text_body: None,
            html_body: None,
            attachment: None,
        }
    }

    pub fn with_text_body(mut self, body: String) -> Self {
        self.text_body = Some(body);
        self
    }

    pub fn with_html_body(mut self, body: String) -> Self {
        self.html_body = Some(body);
        self
    }

    /// Plain-text body plus an escaped HTML alternative of the same text.
    pub fn with_body(self, body: &str) -> Self {
        let html = html_from_text(body);
        self.with_text_body(body.to_string()).with_html_body(html)
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment = Some(path.into());
        self
    }
}

/// Outbound email channel used by the lifecycle services.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError>;
}

/// SMTP email service implementation
pub struct SmtpEmailService {
    pub config: EmailConfig,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpEmailService {
    /// Create a new SMTP email service
    #[instrument(skip(config), fields(host = %config.smtp_host, port = config.smtp_port))]
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        info!("Initializing SMTP email service");

        config.validate().map_err(EmailError::from)?;

        let mut transport_builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            .port(config.smtp_port)
            .timeout(Some(std::time::Duration::from_secs(config.connection_timeout_secs)));

        if config.use_tls {
            let tls_parameters = TlsParameters::new(config.smtp_host.clone())
                .map_err(|e| EmailError::ConfigError(format!("TLS configuration error: {}", e)))?;

            if config.use_starttls {
                transport_builder = transport_builder.tls(Tls::Required(tls_parameters));
            } else {
                transport_builder = transport_builder.tls(Tls::Wrapper(tls_parameters));
            }
        } else {
            transport_builder = transport_builder.tls(Tls::None);
        }

        if !config.smtp_username.is_empty() && !config.smtp_password.is_empty() {
            let credentials = Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            );
            transport_builder = transport_builder.credentials(credentials);
        }

        let transport = transport_builder.build();

        info!("SMTP email service initialized successfully");
        Ok(Self { config, transport })
    }
}

#[async_trait]
impl Notifier for SmtpEmailService {
    /// Send an email message
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        info!("Sending email to: {}", message.to);

        let email_message = build_message(&self.config, message).await?;

        self.transport
            .send(email_message)
            .await
            .map_err(|e| {
                error!("Failed to send email: {}", e);
                EmailError::SmtpError(format!("Failed to send email: {}", e))
            })?;

        info!("Email sent successfully");
        Ok(())
    }
}

/// Builds every message like the SMTP backend but only logs it.
pub struct ConsoleNotifier {
    pub config: EmailConfig,
}

impl ConsoleNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    #[instrument(skip(self, message), fields(to = %message.to, subject = %message.subject))]
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        let attachment = message.attachment.clone();
        let email_message = build_message(&self.config, message).await?;
        info!(
            from = %self.config.sender(),
            attachment = ?attachment,
            bytes = email_message.formatted().len(),
            "Email written to console backend"
        );
        Ok(())
    }
}

/// Build a lettre Message from EmailMessage
pub async fn build_message(config: &EmailConfig, email_message: EmailMessage) -> Result<Message, EmailError> {
    validate_email_address(&email_message.to)?;

    let from_mailbox: Mailbox = config
        .sender()
        .parse()
        .map_err(|e| EmailError::AddressError(format!("Invalid from address: {}", e)))?;

    let to_mailbox: Mailbox = email_message.to
        .parse()
        .map_err(|e| EmailError::AddressError(format!("Invalid to address: {}", e)))?;

    let message_builder = Message::builder()
        .from(from_mailbox)
        .to(to_mailbox)
        .subject(&email_message.subject);

    let content = match (email_message.text_body, email_message.html_body) {
        (Some(text), Some(html)) => MultiPart::alternative_plain_html(text, html),
        (Some(text), None) => MultiPart::mixed().singlepart(SinglePart::plain(text)),
        (None, Some(html)) => MultiPart::mixed().singlepart(SinglePart::html(html)),
        (None, None) => {
            return Err(EmailError::MessageError("No message body provided".to_string()));
        }
    };

    let attachment = match &email_message.attachment {
        Some(path) => load_attachment(path).await?,
        None => None,
    };

    let content = match attachment {
        Some(part) => MultiPart::mixed().multipart(content).singlepart(part),
        None => content,
    };

    message_builder
        .multipart(content)
        .map_err(|e| EmailError::MessageError(format!("Failed to build message: {}", e)))
}

/// Reads an attachment from disk. A missing file degrades to `None`.
async fn load_attachment(path: &Path) -> Result<Option<SinglePart>, EmailError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Attachment not found, sending without it");
            return Ok(None);
        }
        Err(e) => {
            error!(path = %path.display(), "Failed to read attachment: {}", e);
            return Err(EmailError::AttachmentError(format!("{}: {}", path.display(), e)));
        }
    };

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());
    let mime = match path.extension().and_then(|ext| ext.to_str()) {
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    };
    let content_type = ContentType::parse(mime)
        .map_err(|e| EmailError::AttachmentError(format!("Invalid content type {}: {}", mime, e)))?;

    Ok(Some(Attachment::new(filename).body(bytes, content_type)))
}

/// Validate email address format
pub fn validate_email_address(email: &str) -> Result<(), EmailError> {
    if email.is_empty() {
        return Err(EmailError::AddressError("Email address cannot be empty".to_string()));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(EmailError::AddressError("Invalid email format".to_string()));
    }

    Ok(())
}

fn html_from_text(text: &str) -> String {
    let escaped = html_escape::encode_text(text);
    format!(
        "<!DOCTYPE html><html><body><p>{}</p></body></html>",
        escaped.replace("\n\n", "</p><p>").replace('\n', "<br>")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email_address() {
        assert!(validate_email_address("jane@x.com").is_ok());
        assert!(validate_email_address("").is_err());
        assert!(validate_email_address("jane.x.com").is_err());
        assert!(validate_email_address("@x.com").is_err());
        assert!(validate_email_address("a@b@c").is_err());
    }

    #[test]
    fn test_html_body_is_escaped() {
        let message = EmailMessage::new("jane@x.com".to_string(), "Hi".to_string())
            .with_body("Total <b>$220</b>\nThanks");
        let html = message.html_body.unwrap();
        assert!(html.contains("&lt;b&gt;$220&lt;/b&gt;<br>Thanks"));
        assert_eq!(message.text_body.unwrap(), "Total <b>$220</b>\nThanks");
    }

    #[tokio::test]
    async fn test_build_message_skips_missing_attachment() {
        let config = EmailConfig::from_test_env();
        let message = EmailMessage::new("jane@x.com".to_string(), "Quote".to_string())
            .with_body("Please find attached.")
            .with_attachment("/nonexistent/quote_fwz-000000.pdf");
        let built = build_message(&config, message).await.unwrap();
        let raw = String::from_utf8(built.formatted()).unwrap();
        assert!(!raw.contains("quote_fwz-000000.pdf"));
    }

    #[tokio::test]
    async fn test_build_message_includes_attachment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote_fwz-abc123.pdf");
        tokio::fs::write(&path, b"%PDF-1.3 test").await.unwrap();

        let config = EmailConfig::from_test_env();
        let message = EmailMessage::new("jane@x.com".to_string(), "Quote".to_string())
            .with_body("Please find attached.")
            .with_attachment(&path);
        let built = build_message(&config, message).await.unwrap();
        let raw = String::from_utf8(built.formatted()).unwrap();
        assert!(raw.contains("quote_fwz-abc123.pdf"));
        assert!(raw.contains("application/pdf"));
    }

    #[tokio::test]
    async fn test_build_message_rejects_bad_recipient() {
        let config = EmailConfig::from_test_env();
        let message = EmailMessage::new("not-an-address".to_string(), "Quote".to_string())
            .with_body("x");
        let result = build_message(&config, message).await;
        assert!(matches!(result, Err(EmailError::AddressError(_))));
    }

    #[tokio::test]
    async fn test_console_notifier_accepts_message() {
        let notifier = ConsoleNotifier::new(EmailConfig::from_test_env());
        let message = EmailMessage::new("jane@x.com".to_string(), "Hello".to_string())
            .with_body("Body");
        assert!(notifier.send_email(message).await.is_ok());
    }
}
