mod common;

use chrono::{Duration, Utc};

use common::setup;
use fieldworks_backend::dto::career_dto::{ApplicationInput, ApplicationStatusInput, VacancyInput};
use fieldworks_backend::model::career::JobType;
use fieldworks_backend::model::status::ApplicationStatus;
use fieldworks_backend::service::career_service::CareerService;
use fieldworks_backend::util::error::ServiceError;

fn vacancy(title: &str) -> VacancyInput {
    VacancyInput {
        title: title.to_string(),
        slug: None,
        location: Some("Brisbane".to_string()),
        salary: None,
        job_type: JobType::default(),
        description: None,
        is_active: None,
        expired_at: None,
    }
}

fn applicant() -> ApplicationInput {
    ApplicationInput {
        name: "Alex Doe".to_string(),
        email: "alex@x.com".to_string(),
        phone: String::new(),
        resume: Some("resumes/alex.pdf".to_string()),
        message: "Five years of landscaping".to_string(),
    }
}

fn status(status: ApplicationStatus) -> ApplicationStatusInput {
    ApplicationStatusInput {
        status,
        comments: None,
        is_reviewed: None,
    }
}

#[tokio::test]
async fn test_expired_vacancies_are_hidden_and_closed() {
    let app = setup().await;
    let careers = &app.services.careers;
    let open = careers.create_vacancy(vacancy("Gardener")).await.unwrap();
    let mut expired_input = vacancy("Cleaner");
    expired_input.expired_at = Some(Utc::now().date_naive() - Duration::days(1));
    let expired = careers.create_vacancy(expired_input).await.unwrap();

    assert_eq!(open.slug, "gardener");
    assert!(!expired.is_active);

    let listed = careers.list_open_vacancies().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Gardener");

    let result = careers.apply(expired.id.unwrap(), applicant()).await;
    assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn test_status_change_notifies_applicant_once() {
    let app = setup().await;
    let careers = &app.services.careers;
    let open = careers.create_vacancy(vacancy("Gardener")).await.unwrap();
    let application = careers.apply(open.id.unwrap(), applicant()).await.unwrap();
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert!(app.notifier.sent().is_empty());

    let id = application.id.unwrap();
    let updated = careers
        .update_application_status(
            id,
            ApplicationStatusInput {
                status: ApplicationStatus::Shortlist,
                comments: Some("Strong references".to_string()),
                is_reviewed: Some(true),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, ApplicationStatus::Shortlist);
    assert!(updated.is_reviewed);
    assert_eq!(updated.comments, "Strong references");

    // Same status again sends nothing new
    careers.update_application_status(id, status(ApplicationStatus::Shortlist)).await.unwrap();
    let sent = app.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "alex@x.com");
    assert_eq!(sent[0].subject, "Your application has been shortlisted");

    careers.update_application_status(id, status(ApplicationStatus::Selected)).await.unwrap();
    assert_eq!(app.notifier.with_subject("Your application was successful").len(), 1);
}

#[tokio::test]
async fn test_failed_notification_keeps_new_status() {
    let app = setup().await;
    let careers = &app.services.careers;
    let open = careers.create_vacancy(vacancy("Gardener")).await.unwrap();
    let application = careers.apply(open.id.unwrap(), applicant()).await.unwrap();

    app.notifier.set_failing(true);
    let result = careers
        .update_application_status(application.id.unwrap(), status(ApplicationStatus::Rejected))
        .await;
    assert!(matches!(result, Err(ServiceError::Send(_))));

    use fieldworks_backend::repository::career_repo::ApplicationRepository;
    let stored = app.repos.applications.get_by_id(application.id.unwrap()).await.unwrap();
    assert_eq!(stored.status, ApplicationStatus::Rejected);
}

#[tokio::test]
async fn test_apply_to_unknown_vacancy() {
    let app = setup().await;
    let result = app
        .services
        .careers
        .apply(bson::oid::ObjectId::new(), applicant())
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}
