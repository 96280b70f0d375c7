use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use tracing::{info, instrument};

use crate::model::catalog::{Company, Service};
use crate::repository::memory::MemoryTable;
use crate::repository::mongo::MongoStore;
use crate::repository::repository_error::RepositoryResult;

#[async_trait]
pub trait ServiceCatalogRepository: Send + Sync {
    async fn create(&self, service: Service) -> RepositoryResult<Service>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Service>;
    /// Services whose ids are in `ids`; unknown ids are skipped.
    async fn get_many(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Service>>;
    async fn list_active(&self) -> RepositoryResult<Vec<Service>>;
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn create(&self, company: Company) -> RepositoryResult<Company>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Company>;
    /// Oldest company record, used as the default seller.
    async fn first(&self) -> RepositoryResult<Option<Company>>;
}

pub struct MongoServiceCatalogRepository {
    store: MongoStore<Service>,
}

impl MongoServiceCatalogRepository {
    pub fn new(db: &Database) -> Self {
        Self { store: MongoStore::new(db, "services", "Service") }
    }
}

#[async_trait]
impl ServiceCatalogRepository for MongoServiceCatalogRepository {
    #[instrument(skip(self, service), fields(name = %service.name))]
    async fn create(&self, service: Service) -> RepositoryResult<Service> {
        info!("Creating service");
        self.store.insert(service).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Service> {
        info!("Fetching service by ID");
        self.store.get(id).await
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_many(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Service>> {
        info!("Fetching services by IDs");
        self.store.find_many(doc! { "_id": { "$in": ids.to_vec() } }, None).await
    }

    #[instrument(skip(self))]
    async fn list_active(&self) -> RepositoryResult<Vec<Service>> {
        info!("Listing active services");
        self.store.find_many(doc! { "is_active": true }, None).await
    }
}

pub struct MongoCompanyRepository {
    store: MongoStore<Company>,
}

impl MongoCompanyRepository {
    pub fn new(db: &Database) -> Self {
        Self { store: MongoStore::new(db, "companies", "Company") }
    }
}

#[async_trait]
impl CompanyRepository for MongoCompanyRepository {
    #[instrument(skip(self, company), fields(name = %company.name))]
    async fn create(&self, company: Company) -> RepositoryResult<Company> {
        info!("Creating company");
        self.store.insert(company).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Company> {
        info!("Fetching company by ID");
        self.store.get(id).await
    }

    #[instrument(skip(self))]
    async fn first(&self) -> RepositoryResult<Option<Company>> {
        info!("Fetching default company");
        Ok(self.store.find_many(doc! {}, Some((1, 1))).await?.into_iter().next())
    }
}

pub struct InMemoryServiceCatalogRepository {
    table: MemoryTable<Service>,
}

impl InMemoryServiceCatalogRepository {
    pub fn new() -> Self {
        Self { table: MemoryTable::new("Service") }
    }
}

impl Default for InMemoryServiceCatalogRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceCatalogRepository for InMemoryServiceCatalogRepository {
    async fn create(&self, service: Service) -> RepositoryResult<Service> {
        self.table.insert(service).await
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Service> {
        self.table.get(id).await
    }

    async fn get_many(&self, ids: &[ObjectId]) -> RepositoryResult<Vec<Service>> {
        Ok(self
            .table
            .find_many(|s| s.id.map(|id| ids.contains(&id)).unwrap_or(false), None)
            .await)
    }

    async fn list_active(&self) -> RepositoryResult<Vec<Service>> {
        Ok(self.table.find_many(|s| s.is_active, None).await)
    }
}

pub struct InMemoryCompanyRepository {
    table: MemoryTable<Company>,
}

impl InMemoryCompanyRepository {
    pub fn new() -> Self {
        Self { table: MemoryTable::new("Company") }
    }
}

impl Default for InMemoryCompanyRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompanyRepository for InMemoryCompanyRepository {
    async fn create(&self, company: Company) -> RepositoryResult<Company> {
        self.table.insert(company).await
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Company> {
        self.table.get(id).await
    }

    async fn first(&self) -> RepositoryResult<Option<Company>> {
        Ok(self.table.find_one(|_| true).await)
    }
}
