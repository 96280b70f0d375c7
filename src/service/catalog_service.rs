use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::model::catalog::{Company, Service};
use crate::repository::catalog_repo::{CompanyRepository, ServiceCatalogRepository};
use crate::util::error::ServiceError;

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_active_services(&self) -> Result<Vec<Service>, ServiceError>;
    async fn create_service(&self, service: Service) -> Result<Service, ServiceError>;
    async fn create_company(&self, company: Company) -> Result<Company, ServiceError>;
}

pub struct CatalogServiceImpl {
    services: Arc<dyn ServiceCatalogRepository>,
    companies: Arc<dyn CompanyRepository>,
}

impl CatalogServiceImpl {
    pub fn new(services: Arc<dyn ServiceCatalogRepository>, companies: Arc<dyn CompanyRepository>) -> Self {
        Self { services, companies }
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    #[instrument(skip(self))]
    async fn list_active_services(&self) -> Result<Vec<Service>, ServiceError> {
        info!("Listing active services");
        self.services.list_active().await.map_err(|e| {
            error!("Failed to list services: {}", e);
            ServiceError::from(e)
        })
    }

    #[instrument(skip(self, service), fields(name = %service.name))]
    async fn create_service(&self, mut service: Service) -> Result<Service, ServiceError> {
        info!("Creating service");
        if service.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Service name cannot be empty".to_string()));
        }
        service.id = None;
        service.prepare_for_save();
        self.services.create(service).await.map_err(|e| {
            error!("Failed to create service: {}", e);
            ServiceError::from(e)
        })
    }

    #[instrument(skip(self, company), fields(name = %company.name))]
    async fn create_company(&self, mut company: Company) -> Result<Company, ServiceError> {
        info!("Creating company");
        if company.name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("Company name cannot be empty".to_string()));
        }
        company.id = None;
        company.prepare_for_save();
        self.companies.create(company).await.map_err(|e| {
            error!("Failed to create company: {}", e);
            ServiceError::from(e)
        })
    }
}
