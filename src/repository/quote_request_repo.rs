use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use tracing::{info, instrument};

use crate::model::quote_request::QuoteRequest;
use crate::model::status::QuoteStatus;
use crate::model::timestamp;
use crate::repository::memory::MemoryTable;
use crate::repository::mongo::{to_bson_value, MongoStore};
use crate::repository::repository_error::RepositoryResult;

#[async_trait]
pub trait QuoteRequestRepository: Send + Sync {
    async fn create(&self, request: QuoteRequest) -> RepositoryResult<QuoteRequest>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<QuoteRequest>;
    async fn update(&self, request: QuoteRequest) -> RepositoryResult<QuoteRequest>;
    /// Mirrors a quote's status onto its request without touching other fields.
    async fn set_status(&self, id: ObjectId, status: QuoteStatus) -> RepositoryResult<()>;
    async fn list(&self, page: u32, limit: u32) -> RepositoryResult<Vec<QuoteRequest>>;
}

pub struct MongoQuoteRequestRepository {
    store: MongoStore<QuoteRequest>,
}

impl MongoQuoteRequestRepository {
    pub fn new(db: &Database) -> Self {
        Self { store: MongoStore::new(db, "quote_requests", "Quote request") }
    }
}

#[async_trait]
impl QuoteRequestRepository for MongoQuoteRequestRepository {
    #[instrument(skip(self, request), fields(email = %request.email))]
    async fn create(&self, request: QuoteRequest) -> RepositoryResult<QuoteRequest> {
        info!("Creating quote request");
        self.store.insert(request).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<QuoteRequest> {
        info!("Fetching quote request by ID");
        self.store.get(id).await
    }

    #[instrument(skip(self, request), fields(id = ?request.id))]
    async fn update(&self, request: QuoteRequest) -> RepositoryResult<QuoteRequest> {
        info!("Updating quote request");
        self.store.replace(request).await
    }

    #[instrument(skip(self), fields(id = %id, status = %status))]
    async fn set_status(&self, id: ObjectId, status: QuoteStatus) -> RepositoryResult<()> {
        info!("Updating quote request status");
        self.store
            .set_fields(id, doc! { "status": to_bson_value(&status)?, "updated_at": timestamp() })
            .await
    }

    #[instrument(skip(self))]
    async fn list(&self, page: u32, limit: u32) -> RepositoryResult<Vec<QuoteRequest>> {
        info!("Listing quote requests");
        self.store.find_many(doc! {}, Some((page, limit))).await
    }
}

pub struct InMemoryQuoteRequestRepository {
    table: MemoryTable<QuoteRequest>,
}

impl InMemoryQuoteRequestRepository {
    pub fn new() -> Self {
        Self { table: MemoryTable::new("Quote request") }
    }
}

impl Default for InMemoryQuoteRequestRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteRequestRepository for InMemoryQuoteRequestRepository {
    async fn create(&self, request: QuoteRequest) -> RepositoryResult<QuoteRequest> {
        self.table.insert(request).await
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<QuoteRequest> {
        self.table.get(id).await
    }

    async fn update(&self, request: QuoteRequest) -> RepositoryResult<QuoteRequest> {
        self.table.replace(request).await
    }

    async fn set_status(&self, id: ObjectId, status: QuoteStatus) -> RepositoryResult<()> {
        self.table
            .modify(id, |request| {
                request.status = status;
                request.updated_at = Some(timestamp());
            })
            .await
            .map(|_| ())
    }

    async fn list(&self, page: u32, limit: u32) -> RepositoryResult<Vec<QuoteRequest>> {
        Ok(self.table.find_many(|_| true, Some((page, limit))).await)
    }
}
