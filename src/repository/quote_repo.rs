use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use tracing::{info, instrument};

use crate::model::quote::Quote;
use crate::model::status::QuoteStatus;
use crate::model::timestamp;
use crate::repository::memory::MemoryTable;
use crate::repository::mongo::{to_bson_value, MongoStore};
use crate::repository::repository_error::RepositoryResult;

#[async_trait]
pub trait QuoteRepository: Send + Sync {
    async fn create(&self, quote: Quote) -> RepositoryResult<Quote>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote>;
    async fn update(&self, quote: Quote) -> RepositoryResult<Quote>;
    async fn set_status(&self, id: ObjectId, status: QuoteStatus) -> RepositoryResult<Quote>;
    async fn set_mail_sent(&self, id: ObjectId, mail_sent: bool) -> RepositoryResult<()>;
    async fn set_quotation_file(&self, id: ObjectId, path: &str) -> RepositoryResult<()>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn list(&self, page: u32, limit: u32) -> RepositoryResult<Vec<Quote>>;
}

pub struct MongoQuoteRepository {
    store: MongoStore<Quote>,
}

impl MongoQuoteRepository {
    pub fn new(db: &Database) -> Self {
        Self { store: MongoStore::new(db, "quotes", "Quote") }
    }
}

#[async_trait]
impl QuoteRepository for MongoQuoteRepository {
    #[instrument(skip(self, quote), fields(quote_id = ?quote.quote_id))]
    async fn create(&self, quote: Quote) -> RepositoryResult<Quote> {
        info!("Creating new quote");
        self.store.insert(quote).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote> {
        info!("Fetching quote by ID");
        self.store.get(id).await
    }

    #[instrument(skip(self, quote), fields(id = ?quote.id, status = %quote.status))]
    async fn update(&self, quote: Quote) -> RepositoryResult<Quote> {
        info!("Updating quote");
        self.store.replace(quote).await
    }

    #[instrument(skip(self), fields(id = %id, status = %status))]
    async fn set_status(&self, id: ObjectId, status: QuoteStatus) -> RepositoryResult<Quote> {
        info!("Updating quote status");
        self.store
            .set_fields(id, doc! { "status": to_bson_value(&status)?, "updated_at": timestamp() })
            .await?;
        self.store.get(id).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn set_mail_sent(&self, id: ObjectId, mail_sent: bool) -> RepositoryResult<()> {
        info!(mail_sent, "Updating quote mail flag");
        self.store.set_fields(id, doc! { "mail_sent": mail_sent }).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn set_quotation_file(&self, id: ObjectId, path: &str) -> RepositoryResult<()> {
        info!(path, "Recording quote document");
        self.store.set_fields(id, doc! { "quotation_file": path }).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        info!("Deleting quote");
        self.store.delete(id).await
    }

    #[instrument(skip(self))]
    async fn list(&self, page: u32, limit: u32) -> RepositoryResult<Vec<Quote>> {
        info!("Listing quotes");
        self.store.find_many(doc! {}, Some((page, limit))).await
    }
}

pub struct InMemoryQuoteRepository {
    table: MemoryTable<Quote>,
}

impl InMemoryQuoteRepository {
    pub fn new() -> Self {
        Self { table: MemoryTable::new("Quote") }
    }
}

impl Default for InMemoryQuoteRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteRepository for InMemoryQuoteRepository {
    async fn create(&self, quote: Quote) -> RepositoryResult<Quote> {
        self.table.insert(quote).await
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Quote> {
        self.table.get(id).await
    }

    async fn update(&self, quote: Quote) -> RepositoryResult<Quote> {
        self.table.replace(quote).await
    }

    async fn set_status(&self, id: ObjectId, status: QuoteStatus) -> RepositoryResult<Quote> {
        self.table
            .modify(id, |quote| {
                quote.status = status;
                quote.updated_at = Some(timestamp());
            })
            .await
    }

    async fn set_mail_sent(&self, id: ObjectId, mail_sent: bool) -> RepositoryResult<()> {
        self.table.modify(id, |quote| quote.mail_sent = mail_sent).await.map(|_| ())
    }

    async fn set_quotation_file(&self, id: ObjectId, path: &str) -> RepositoryResult<()> {
        let path = path.to_string();
        self.table
            .modify(id, |quote| quote.quotation_file = Some(path))
            .await
            .map(|_| ())
    }

    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        self.table.delete(id).await
    }

    async fn list(&self, page: u32, limit: u32) -> RepositoryResult<Vec<Quote>> {
        Ok(self.table.find_many(|_| true, Some((page, limit))).await)
    }
}
