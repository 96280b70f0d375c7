use axum::{routing::get, Router};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::{AppConfig, EmailBackend, EmailConfig, LifecycleConfig, MediaConfig, MongoConfig, StorageBackend};
use crate::repository::{mongo, Repositories};
use crate::router::career_router::career_router;
use crate::router::quote_router::quote_router;
use crate::router::site_router::{catalog_router, contact_router, template_router};
use crate::service::career_service::CareerServiceImpl;
use crate::service::catalog_service::CatalogServiceImpl;
use crate::service::contact_service::ContactServiceImpl;
use crate::service::quote_service::QuoteServiceImpl;
use crate::service::template_service::TemplateServiceImpl;
use crate::util::email::{ConsoleNotifier, Notifier, SmtpEmailService};
use crate::util::pdf::PdfRenderer;

/// Every service the HTTP surface dispatches to.
#[derive(Clone)]
pub struct AppServices {
    pub quotes: Arc<QuoteServiceImpl>,
    pub catalog: Arc<CatalogServiceImpl>,
    pub templates: Arc<TemplateServiceImpl>,
    pub contacts: Arc<ContactServiceImpl>,
    pub careers: Arc<CareerServiceImpl>,
}

impl AppServices {
    pub fn new(
        repos: Repositories,
        media: MediaConfig,
        lifecycle: LifecycleConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let templates = Arc::new(TemplateServiceImpl::new(repos.email_templates.clone()));
        let catalog = Arc::new(CatalogServiceImpl::new(repos.services.clone(), repos.companies.clone()));
        let contacts = Arc::new(ContactServiceImpl::new(repos.contacts.clone()));
        let careers = Arc::new(CareerServiceImpl::new(
            repos.vacancies.clone(),
            repos.applications.clone(),
            templates.clone(),
            notifier.clone(),
        ));
        let quotes = Arc::new(QuoteServiceImpl::new(
            repos,
            PdfRenderer::new(media),
            notifier,
            templates.clone(),
            lifecycle,
        ));

        AppServices {
            quotes,
            catalog,
            templates,
            contacts,
            careers,
        }
    }
}

pub fn build_router(services: &AppServices) -> Router {
    Router::new()
        .merge(quote_router(services.quotes.clone()))
        .merge(catalog_router(services.catalog.clone()))
        .merge(template_router(services.templates.clone()))
        .merge(contact_router(services.contacts.clone()))
        .merge(career_router(services.careers.clone()))
        .route("/health", get(|| async { "OK" }))
}

pub struct App {
    config: AppConfig,
    router: Router,
    pub services: AppServices,
}

impl App {
    pub async fn new() -> Result<Self, Box<dyn Error>> {
        let config = AppConfig::from_env()?;
        let media = MediaConfig::from_env()?;
        let lifecycle = LifecycleConfig::from_env()?;

        let repos = match config.storage {
            StorageBackend::Mongo => {
                let mongo_config = MongoConfig::from_env()?;
                let db = mongo::connect(&mongo_config).await?;
                Repositories::mongo(&db)
            }
            StorageBackend::Memory => {
                warn!("Using in-memory storage, data is lost on restart");
                Repositories::in_memory()
            }
        };

        let notifier: Arc<dyn Notifier> = match config.email {
            EmailBackend::Smtp => Arc::new(SmtpEmailService::new(EmailConfig::from_env()?)?),
            EmailBackend::Console => {
                info!("Email delivery goes to the log");
                Arc::new(ConsoleNotifier::new(EmailConfig::sender_from_env()))
            }
        };

        let services = AppServices::new(repos, media, lifecycle, notifier);
        let router = build_router(&services);
        Ok(App {
            config,
            router,
            services,
        })
    }

    pub async fn start(self) -> Result<(), Box<dyn Error>> {
        let addr = SocketAddr::new(self.config.host.parse()?, self.config.port);
        info!("🚀 Server running at http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind {}: {}", addr, e);
            e
        })?;
        axum::serve(listener, self.router).await?;
        Ok(())
    }
}
