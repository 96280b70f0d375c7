#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use fieldworks_backend::app::AppServices;
use fieldworks_backend::config::{LifecycleConfig, MediaConfig};
use fieldworks_backend::dto::quote_dto::{CreateQuoteRequestDto, QuoteInput, QuoteItemInput};
use fieldworks_backend::model::catalog::{Company, Service};
use fieldworks_backend::model::quote_request::QuoteRequest;
use fieldworks_backend::repository::catalog_repo::{CompanyRepository, ServiceCatalogRepository};
use fieldworks_backend::repository::Repositories;
use fieldworks_backend::service::quote_service::QuoteService;
use fieldworks_backend::util::email::{EmailError, EmailMessage, Notifier};
use rust_decimal::Decimal;

/// Keeps every message instead of delivering it. `fail` makes the next sends error.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<EmailMessage>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn with_subject(&self, subject: &str) -> Vec<EmailMessage> {
        self.sent().into_iter().filter(|m| m.subject == subject).collect()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmailError::SmtpError("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

pub struct TestApp {
    pub services: AppServices,
    pub repos: Repositories,
    pub notifier: Arc<RecordingNotifier>,
    pub media: TempDir,
    pub lawn: Service,
    pub cleaning: Service,
    pub company: Company,
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").with_test_writer().try_init();
}

pub async fn setup() -> TestApp {
    setup_with(LifecycleConfig::default()).await
}

pub async fn setup_with(lifecycle: LifecycleConfig) -> TestApp {
    init_tracing();
    let media = tempfile::tempdir().unwrap();
    let repos = Repositories::in_memory();
    let notifier = Arc::new(RecordingNotifier::default());

    let lawn = repos.services.create(Service::new("Lawn Mowing")).await.unwrap();
    let cleaning = repos.services.create(Service::new("End of Lease Cleaning")).await.unwrap();
    let company = repos
        .companies
        .create(Company {
            name: "Fieldworks Gardens".to_string(),
            slug: "fieldworks-gardens".to_string(),
            email: Some("office@fieldworks.test".to_string()),
            bsb: Some("062-000".to_string()),
            account_number: Some("12345678".to_string()),
            ..Company::default()
        })
        .await
        .unwrap();

    let services = AppServices::new(
        repos.clone(),
        MediaConfig::with_root(media.path()),
        lifecycle,
        notifier.clone(),
    );

    TestApp {
        services,
        repos,
        notifier,
        media,
        lawn,
        cleaning,
        company,
    }
}

impl TestApp {
    pub fn service_hex(&self, service: &Service) -> String {
        service.id.unwrap().to_hex()
    }

    pub async fn submit_request(&self) -> QuoteRequest {
        let dto = CreateQuoteRequestDto {
            name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            phone: "0400 000 000".to_string(),
            services: vec![self.service_hex(&self.lawn)],
            city: Some("Brisbane".to_string()),
            postal_code: Some("4000".to_string()),
            address: Some("1 Queen St".to_string()),
            message: "Front and back lawn".to_string(),
        };
        self.services.quotes.submit_request(dto).await.unwrap()
    }

    pub fn quote_for(&self, request: &QuoteRequest) -> QuoteInput {
        QuoteInput {
            quote_request_id: Some(request.id.unwrap().to_hex()),
            ..QuoteInput::default()
        }
    }

    pub fn lawn_item(&self, quantity: u32, rate: Decimal) -> QuoteItemInput {
        QuoteItemInput {
            service_id: self.service_hex(&self.lawn),
            quantity,
            rate,
        }
    }
}

pub fn dollars(value: i64) -> Decimal {
    Decimal::new(value * 100, 2)
}
