use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::dto::career_dto::{ApplicationInput, ApplicationStatusInput, VacancyInput};
use crate::model::career::{Application, Vacancy};
use crate::model::email_template::MessageType;
use crate::model::status::ApplicationStatus;
use crate::model::timestamp;
use crate::repository::career_repo::{ApplicationRepository, VacancyRepository};
use crate::service::template_service::TemplateService;
use crate::util::email::{EmailMessage, Notifier};
use crate::util::error::ServiceError;

/// Template to send when an application moves from `previous` to `next`.
pub fn notification_for(previous: ApplicationStatus, next: ApplicationStatus) -> Option<MessageType> {
    if previous == next {
        return None;
    }
    match next {
        ApplicationStatus::Shortlist => Some(MessageType::Shortlist),
        ApplicationStatus::Selected => Some(MessageType::Selected),
        ApplicationStatus::Rejected => Some(MessageType::Rejected),
        ApplicationStatus::Pending => None,
    }
}

#[async_trait]
pub trait CareerService: Send + Sync {
    async fn list_open_vacancies(&self) -> Result<Vec<Vacancy>, ServiceError>;
    async fn create_vacancy(&self, input: VacancyInput) -> Result<Vacancy, ServiceError>;
    async fn apply(&self, vacancy_id: ObjectId, input: ApplicationInput) -> Result<Application, ServiceError>;
    async fn update_application_status(
        &self,
        id: ObjectId,
        input: ApplicationStatusInput,
    ) -> Result<Application, ServiceError>;
}

pub struct CareerServiceImpl {
    vacancies: Arc<dyn VacancyRepository>,
    applications: Arc<dyn ApplicationRepository>,
    templates: Arc<dyn TemplateService>,
    notifier: Arc<dyn Notifier>,
}

impl CareerServiceImpl {
    pub fn new(
        vacancies: Arc<dyn VacancyRepository>,
        applications: Arc<dyn ApplicationRepository>,
        templates: Arc<dyn TemplateService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            vacancies,
            applications,
            templates,
            notifier,
        }
    }
}

#[async_trait]
impl CareerService for CareerServiceImpl {
    #[instrument(skip(self))]
    async fn list_open_vacancies(&self) -> Result<Vec<Vacancy>, ServiceError> {
        info!("Listing open vacancies");
        let today = Utc::now().date_naive();
        let vacancies = self.vacancies.list_active().await?;
        Ok(vacancies.into_iter().filter(|v| !v.is_expired(today)).collect())
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    async fn create_vacancy(&self, input: VacancyInput) -> Result<Vacancy, ServiceError> {
        info!("Creating vacancy");
        let mut vacancy = Vacancy::new(input.title);
        vacancy.slug = input.slug.unwrap_or_default();
        vacancy.location = input.location;
        vacancy.salary = input.salary;
        vacancy.job_type = input.job_type;
        vacancy.description = input.description;
        vacancy.is_active = input.is_active.unwrap_or(true);
        vacancy.expired_at = input.expired_at;
        vacancy.prepare_for_save(Utc::now().date_naive());

        self.vacancies.create(vacancy).await.map_err(|e| {
            error!("Failed to create vacancy: {}", e);
            ServiceError::from(e)
        })
    }

    #[instrument(skip(self, input), fields(vacancy_id = %vacancy_id))]
    async fn apply(&self, vacancy_id: ObjectId, input: ApplicationInput) -> Result<Application, ServiceError> {
        info!("Submitting application");
        let vacancy = self.vacancies.get_by_id(vacancy_id).await?;
        if !vacancy.is_active || vacancy.is_expired(Utc::now().date_naive()) {
            error!("Vacancy is not open for applications");
            return Err(ServiceError::InvalidInput(format!(
                "Vacancy {} is not accepting applications",
                vacancy.title
            )));
        }

        let application = Application {
            id: None,
            vacancy_id,
            name: input.name,
            email: input.email,
            phone: input.phone,
            resume: input.resume,
            message: input.message,
            applied_at: Some(timestamp()),
            is_reviewed: false,
            comments: String::new(),
            status: ApplicationStatus::Pending,
        };
        self.applications.create(application).await.map_err(|e| {
            error!("Failed to store application: {}", e);
            ServiceError::from(e)
        })
    }

    #[instrument(skip(self, input), fields(id = %id, status = %input.status))]
    async fn update_application_status(
        &self,
        id: ObjectId,
        input: ApplicationStatusInput,
    ) -> Result<Application, ServiceError> {
        info!("Updating application status");
        let mut application = self.applications.get_by_id(id).await?;
        let previous = application.status;

        application.status = input.status;
        if let Some(comments) = input.comments {
            application.comments = comments;
        }
        if let Some(is_reviewed) = input.is_reviewed {
            application.is_reviewed = is_reviewed;
        }
        let application = self.applications.update(application).await?;

        if let Some(message_type) = notification_for(previous, application.status) {
            let template = self.templates.resolve(message_type).await?;
            let message = EmailMessage::new(application.email.clone(), template.subject).with_body(&template.body);
            self.notifier.send_email(message).await.map_err(|e| {
                error!("Failed to notify applicant: {}", e);
                ServiceError::from(e)
            })?;
            info!(message_type = %message_type, "Applicant notified");
        }
        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_only_on_change() {
        assert_eq!(
            notification_for(ApplicationStatus::Pending, ApplicationStatus::Shortlist),
            Some(MessageType::Shortlist)
        );
        assert_eq!(
            notification_for(ApplicationStatus::Shortlist, ApplicationStatus::Selected),
            Some(MessageType::Selected)
        );
        assert_eq!(
            notification_for(ApplicationStatus::Rejected, ApplicationStatus::Rejected),
            None
        );
        assert_eq!(
            notification_for(ApplicationStatus::Shortlist, ApplicationStatus::Pending),
            None
        );
    }
}
