use async_trait::async_trait;
use bson::oid::ObjectId;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::model::email_template::{EmailMessageTemplate, MessageType};
use crate::repository::email_template_repo::EmailTemplateRepository;
use crate::util::error::ServiceError;

/// Subject and body ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTemplate {
    pub subject: String,
    pub body: String,
    /// `false` when the built-in default was used
    pub stored: bool,
}

/// Built-in subject/body used when no active template exists for a type.
pub fn default_template(message_type: MessageType) -> (&'static str, &'static str) {
    match message_type {
        MessageType::Init => (
            "Quote Request Received",
            "We have received your quote request. We will get back to you soon. Thanks",
        ),
        MessageType::Quote => (
            "Your quote is ready",
            "Your quote is ready. Please find the attached PDF.",
        ),
        MessageType::Invoice => (
            "Your invoice is ready",
            "Your invoice is ready. Please find the attached PDF.",
        ),
        MessageType::Shortlist => (
            "Your application has been shortlisted",
            "Thank you for applying. Your application has been shortlisted and we will contact you about the next steps.",
        ),
        MessageType::Selected => (
            "Your application was successful",
            "Congratulations, you have been selected for the position. We will be in touch shortly with the details.",
        ),
        MessageType::Rejected => (
            "Update on your application",
            "Thank you for your interest. Unfortunately we will not be moving forward with your application at this time.",
        ),
    }
}

#[async_trait]
pub trait TemplateService: Send + Sync {
    /// First active template of the type, or the built-in default. Never fails for a missing template.
    async fn resolve(&self, message_type: MessageType) -> Result<ResolvedTemplate, ServiceError>;
    async fn list_templates(&self) -> Result<Vec<EmailMessageTemplate>, ServiceError>;
    async fn create_template(&self, template: EmailMessageTemplate) -> Result<EmailMessageTemplate, ServiceError>;
    async fn update_template(&self, id: ObjectId, template: EmailMessageTemplate) -> Result<EmailMessageTemplate, ServiceError>;
}

pub struct TemplateServiceImpl {
    repo: Arc<dyn EmailTemplateRepository>,
}

impl TemplateServiceImpl {
    pub fn new(repo: Arc<dyn EmailTemplateRepository>) -> Self {
        Self { repo }
    }
}

fn check_template(template: &EmailMessageTemplate) -> Result<(), ServiceError> {
    if template.subject.trim().is_empty() {
        return Err(ServiceError::InvalidInput("Template subject cannot be empty".to_string()));
    }
    if template.body.trim().is_empty() {
        return Err(ServiceError::InvalidInput("Template body cannot be empty".to_string()));
    }
    Ok(())
}

#[async_trait]
impl TemplateService for TemplateServiceImpl {
    #[instrument(skip(self), fields(message_type = %message_type))]
    async fn resolve(&self, message_type: MessageType) -> Result<ResolvedTemplate, ServiceError> {
        info!("Resolving email template");
        match self.repo.first_active(message_type).await {
            Ok(Some(template)) => Ok(ResolvedTemplate {
                subject: template.subject,
                body: template.body,
                stored: true,
            }),
            Ok(None) => {
                warn!("No active template, using built-in default");
                let (subject, body) = default_template(message_type);
                Ok(ResolvedTemplate {
                    subject: subject.to_string(),
                    body: body.to_string(),
                    stored: false,
                })
            }
            Err(e) => {
                error!("Failed to resolve email template: {}", e);
                Err(ServiceError::from(e))
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_templates(&self) -> Result<Vec<EmailMessageTemplate>, ServiceError> {
        info!("Listing email templates");
        self.repo.list().await.map_err(|e| {
            error!("Failed to list email templates: {}", e);
            ServiceError::from(e)
        })
    }

    #[instrument(skip(self, template), fields(message_type = %template.message_type))]
    async fn create_template(&self, mut template: EmailMessageTemplate) -> Result<EmailMessageTemplate, ServiceError> {
        info!("Creating email template");
        check_template(&template)?;
        template.id = None;
        self.repo.create(template).await.map_err(|e| {
            error!("Failed to create email template: {}", e);
            ServiceError::from(e)
        })
    }

    #[instrument(skip(self, template), fields(id = %id))]
    async fn update_template(&self, id: ObjectId, mut template: EmailMessageTemplate) -> Result<EmailMessageTemplate, ServiceError> {
        info!("Updating email template");
        check_template(&template)?;
        self.repo.get_by_id(id).await?;
        template.id = Some(id);
        self.repo.update(template).await.map_err(|e| {
            error!("Failed to update email template: {}", e);
            ServiceError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::email_template_repo::InMemoryEmailTemplateRepository;

    fn service() -> TemplateServiceImpl {
        TemplateServiceImpl::new(Arc::new(InMemoryEmailTemplateRepository::new()))
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_default() {
        let resolved = service().resolve(MessageType::Quote).await.unwrap();
        assert_eq!(resolved.subject, "Your quote is ready");
        assert_eq!(resolved.body, "Your quote is ready. Please find the attached PDF.");
        assert!(!resolved.stored);
    }

    #[tokio::test]
    async fn test_inactive_template_is_ignored() {
        let service = service();
        let mut inactive = EmailMessageTemplate::new(MessageType::Quote, "Old", "Old body");
        inactive.is_active = false;
        service.create_template(inactive).await.unwrap();

        let resolved = service.resolve(MessageType::Quote).await.unwrap();
        assert!(!resolved.stored);
    }

    #[tokio::test]
    async fn test_first_active_template_wins() {
        let service = service();
        service
            .create_template(EmailMessageTemplate::new(MessageType::Invoice, "Invoice A", "Body A"))
            .await
            .unwrap();
        service
            .create_template(EmailMessageTemplate::new(MessageType::Invoice, "Invoice B", "Body B"))
            .await
            .unwrap();

        let resolved = service.resolve(MessageType::Invoice).await.unwrap();
        assert_eq!(resolved.subject, "Invoice A");
        assert!(resolved.stored);

        let other = service.resolve(MessageType::Init).await.unwrap();
        assert_eq!(other.subject, "Quote Request Received");
    }

    #[tokio::test]
    async fn test_blank_template_rejected() {
        let result = service()
            .create_template(EmailMessageTemplate::new(MessageType::Init, " ", "Body"))
            .await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_update_unknown_template_is_not_found() {
        let result = service()
            .update_template(ObjectId::new(), EmailMessageTemplate::new(MessageType::Init, "S", "B"))
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }
}
