use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use tracing::{info, instrument};

use crate::model::quote::QuoteItem;
use crate::repository::memory::MemoryTable;
use crate::repository::mongo::MongoStore;
use crate::repository::repository_error::RepositoryResult;

#[async_trait]
pub trait QuoteItemRepository: Send + Sync {
    async fn create(&self, item: QuoteItem) -> RepositoryResult<QuoteItem>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<QuoteItem>;
    async fn update(&self, item: QuoteItem) -> RepositoryResult<QuoteItem>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn list_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteItem>>;
    async fn delete_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<u64>;
}

pub struct MongoQuoteItemRepository {
    store: MongoStore<QuoteItem>,
}

impl MongoQuoteItemRepository {
    pub fn new(db: &Database) -> Self {
        Self { store: MongoStore::new(db, "quote_items", "Quote item") }
    }
}

#[async_trait]
impl QuoteItemRepository for MongoQuoteItemRepository {
    #[instrument(skip(self, item), fields(quote_id = %item.quote_id))]
    async fn create(&self, item: QuoteItem) -> RepositoryResult<QuoteItem> {
        info!("Creating quote item");
        self.store.insert(item).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<QuoteItem> {
        info!("Fetching quote item by ID");
        self.store.get(id).await
    }

    #[instrument(skip(self, item), fields(id = ?item.id))]
    async fn update(&self, item: QuoteItem) -> RepositoryResult<QuoteItem> {
        info!("Updating quote item");
        self.store.replace(item).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        info!("Deleting quote item");
        self.store.delete(id).await
    }

    #[instrument(skip(self), fields(quote_id = %quote_id))]
    async fn list_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteItem>> {
        info!("Listing quote items");
        self.store.find_many(doc! { "quote_id": quote_id }, None).await
    }

    #[instrument(skip(self), fields(quote_id = %quote_id))]
    async fn delete_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<u64> {
        info!("Deleting quote items");
        self.store.delete_many(doc! { "quote_id": quote_id }).await
    }
}

pub struct InMemoryQuoteItemRepository {
    table: MemoryTable<QuoteItem>,
}

impl InMemoryQuoteItemRepository {
    pub fn new() -> Self {
        Self { table: MemoryTable::new("Quote item") }
    }
}

impl Default for InMemoryQuoteItemRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteItemRepository for InMemoryQuoteItemRepository {
    async fn create(&self, item: QuoteItem) -> RepositoryResult<QuoteItem> {
        self.table.insert(item).await
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<QuoteItem> {
        self.table.get(id).await
    }

    async fn update(&self, item: QuoteItem) -> RepositoryResult<QuoteItem> {
        self.table.replace(item).await
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        self.table.delete(id).await
    }

    async fn list_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<Vec<QuoteItem>> {
        Ok(self.table.find_many(|item| item.quote_id == quote_id, None).await)
    }

    async fn delete_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<u64> {
        Ok(self.table.delete_many(|item| item.quote_id == quote_id).await)
    }
}
