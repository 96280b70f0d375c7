pub mod career_repo;
pub mod catalog_repo;
pub mod contact_repo;
pub mod email_template_repo;
pub mod invoice_repo;
pub mod memory;
pub mod mongo;
pub mod quote_item_repo;
pub mod quote_repo;
pub mod quote_request_repo;
pub mod repository_error;

use mongodb::Database;
use std::sync::Arc;

use career_repo::*;
use catalog_repo::*;
use contact_repo::*;
use email_template_repo::*;
use invoice_repo::*;
use quote_item_repo::*;
use quote_repo::*;
use quote_request_repo::*;

/// One handle per collection, shared by the services.
#[derive(Clone)]
pub struct Repositories {
    pub services: Arc<dyn ServiceCatalogRepository>,
    pub companies: Arc<dyn CompanyRepository>,
    pub quote_requests: Arc<dyn QuoteRequestRepository>,
    pub quotes: Arc<dyn QuoteRepository>,
    pub quote_items: Arc<dyn QuoteItemRepository>,
    pub invoices: Arc<dyn InvoiceRepository>,
    pub email_templates: Arc<dyn EmailTemplateRepository>,
    pub contacts: Arc<dyn ContactRepository>,
    pub vacancies: Arc<dyn VacancyRepository>,
    pub applications: Arc<dyn ApplicationRepository>,
}

impl Repositories {
    pub fn mongo(db: &Database) -> Self {
        Repositories {
            services: Arc::new(MongoServiceCatalogRepository::new(db)),
            companies: Arc::new(MongoCompanyRepository::new(db)),
            quote_requests: Arc::new(MongoQuoteRequestRepository::new(db)),
            quotes: Arc::new(MongoQuoteRepository::new(db)),
            quote_items: Arc::new(MongoQuoteItemRepository::new(db)),
            invoices: Arc::new(MongoInvoiceRepository::new(db)),
            email_templates: Arc::new(MongoEmailTemplateRepository::new(db)),
            contacts: Arc::new(MongoContactRepository::new(db)),
            vacancies: Arc::new(MongoVacancyRepository::new(db)),
            applications: Arc::new(MongoApplicationRepository::new(db)),
        }
    }

    pub fn in_memory() -> Self {
        Repositories {
            services: Arc::new(InMemoryServiceCatalogRepository::new()),
            companies: Arc::new(InMemoryCompanyRepository::new()),
            quote_requests: Arc::new(InMemoryQuoteRequestRepository::new()),
            quotes: Arc::new(InMemoryQuoteRepository::new()),
            quote_items: Arc::new(InMemoryQuoteItemRepository::new()),
            invoices: Arc::new(InMemoryInvoiceRepository::new()),
            email_templates: Arc::new(InMemoryEmailTemplateRepository::new()),
            contacts: Arc::new(InMemoryContactRepository::new()),
            vacancies: Arc::new(InMemoryVacancyRepository::new()),
            applications: Arc::new(InMemoryApplicationRepository::new()),
        }
    }
}
