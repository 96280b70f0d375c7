use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use tracing::{info, instrument};

use crate::model::career::{Application, Vacancy};
use crate::repository::memory::MemoryTable;
use crate::repository::mongo::MongoStore;
use crate::repository::repository_error::RepositoryResult;

#[async_trait]
pub trait VacancyRepository: Send + Sync {
    async fn create(&self, vacancy: Vacancy) -> RepositoryResult<Vacancy>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Vacancy>;
    async fn update(&self, vacancy: Vacancy) -> RepositoryResult<Vacancy>;
    async fn list_active(&self) -> RepositoryResult<Vec<Vacancy>>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn create(&self, application: Application) -> RepositoryResult<Application>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Application>;
    async fn update(&self, application: Application) -> RepositoryResult<Application>;
    async fn list_by_vacancy(&self, vacancy_id: ObjectId) -> RepositoryResult<Vec<Application>>;
}

pub struct MongoVacancyRepository {
    store: MongoStore<Vacancy>,
}

impl MongoVacancyRepository {
    pub fn new(db: &Database) -> Self {
        Self { store: MongoStore::new(db, "vacancies", "Vacancy") }
    }
}

#[async_trait]
impl VacancyRepository for MongoVacancyRepository {
    #[instrument(skip(self, vacancy), fields(title = %vacancy.title))]
    async fn create(&self, vacancy: Vacancy) -> RepositoryResult<Vacancy> {
        info!("Creating vacancy");
        self.store.insert(vacancy).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Vacancy> {
        info!("Fetching vacancy by ID");
        self.store.get(id).await
    }

    #[instrument(skip(self, vacancy), fields(id = ?vacancy.id))]
    async fn update(&self, vacancy: Vacancy) -> RepositoryResult<Vacancy> {
        info!("Updating vacancy");
        self.store.replace(vacancy).await
    }

    #[instrument(skip(self))]
    async fn list_active(&self) -> RepositoryResult<Vec<Vacancy>> {
        info!("Listing active vacancies");
        self.store.find_many(doc! { "is_active": true }, None).await
    }
}

pub struct MongoApplicationRepository {
    store: MongoStore<Application>,
}

impl MongoApplicationRepository {
    pub fn new(db: &Database) -> Self {
        Self { store: MongoStore::new(db, "applications", "Application") }
    }
}

#[async_trait]
impl ApplicationRepository for MongoApplicationRepository {
    #[instrument(skip(self, application), fields(vacancy_id = %application.vacancy_id))]
    async fn create(&self, application: Application) -> RepositoryResult<Application> {
        info!("Creating application");
        self.store.insert(application).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Application> {
        info!("Fetching application by ID");
        self.store.get(id).await
    }

    #[instrument(skip(self, application), fields(id = ?application.id))]
    async fn update(&self, application: Application) -> RepositoryResult<Application> {
        info!("Updating application");
        self.store.replace(application).await
    }

    #[instrument(skip(self), fields(vacancy_id = %vacancy_id))]
    async fn list_by_vacancy(&self, vacancy_id: ObjectId) -> RepositoryResult<Vec<Application>> {
        info!("Listing applications for vacancy");
        self.store.find_many(doc! { "vacancy_id": vacancy_id }, None).await
    }
}

pub struct InMemoryVacancyRepository {
    table: MemoryTable<Vacancy>,
}

impl InMemoryVacancyRepository {
    pub fn new() -> Self {
        Self { table: MemoryTable::new("Vacancy") }
    }
}

impl Default for InMemoryVacancyRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VacancyRepository for InMemoryVacancyRepository {
    async fn create(&self, vacancy: Vacancy) -> RepositoryResult<Vacancy> {
        self.table.insert(vacancy).await
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Vacancy> {
        self.table.get(id).await
    }

    async fn update(&self, vacancy: Vacancy) -> RepositoryResult<Vacancy> {
        self.table.replace(vacancy).await
    }

    async fn list_active(&self) -> RepositoryResult<Vec<Vacancy>> {
        Ok(self.table.find_many(|v| v.is_active, None).await)
    }
}

pub struct InMemoryApplicationRepository {
    table: MemoryTable<Application>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self { table: MemoryTable::new("Application") }
    }
}

impl Default for InMemoryApplicationRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn create(&self, application: Application) -> RepositoryResult<Application> {
        self.table.insert(application).await
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Application> {
        self.table.get(id).await
    }

    async fn update(&self, application: Application) -> RepositoryResult<Application> {
        self.table.replace(application).await
    }

    async fn list_by_vacancy(&self, vacancy_id: ObjectId) -> RepositoryResult<Vec<Application>> {
        Ok(self.table.find_many(|a| a.vacancy_id == vacancy_id, None).await)
    }
}
