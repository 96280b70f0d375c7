use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use tracing::{info, instrument};

use crate::model::invoice::Invoice;
use crate::repository::memory::MemoryTable;
use crate::repository::mongo::MongoStore;
use crate::repository::repository_error::RepositoryResult;

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn create(&self, invoice: Invoice) -> RepositoryResult<Invoice>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Invoice>;
    /// The invoice issued for a quote, if any. At most one exists.
    async fn find_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<Option<Invoice>>;
    async fn update(&self, invoice: Invoice) -> RepositoryResult<Invoice>;
    async fn set_invoice_file(&self, id: ObjectId, path: &str) -> RepositoryResult<()>;
    async fn set_is_sent(&self, id: ObjectId, is_sent: bool) -> RepositoryResult<()>;
    async fn delete_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<u64>;
    async fn list(&self, page: u32, limit: u32) -> RepositoryResult<Vec<Invoice>>;
}

pub struct MongoInvoiceRepository {
    store: MongoStore<Invoice>,
}

impl MongoInvoiceRepository {
    pub fn new(db: &Database) -> Self {
        Self { store: MongoStore::new(db, "invoices", "Invoice") }
    }
}

#[async_trait]
impl InvoiceRepository for MongoInvoiceRepository {
    #[instrument(skip(self, invoice), fields(quote_id = %invoice.quote_id))]
    async fn create(&self, invoice: Invoice) -> RepositoryResult<Invoice> {
        info!("Creating invoice");
        self.store.insert(invoice).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Invoice> {
        info!("Fetching invoice by ID");
        self.store.get(id).await
    }

    #[instrument(skip(self), fields(quote_id = %quote_id))]
    async fn find_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<Option<Invoice>> {
        info!("Fetching invoice by quote");
        self.store.find_one(doc! { "quote_id": quote_id }).await
    }

    #[instrument(skip(self, invoice), fields(id = ?invoice.id))]
    async fn update(&self, invoice: Invoice) -> RepositoryResult<Invoice> {
        info!("Updating invoice");
        self.store.replace(invoice).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn set_invoice_file(&self, id: ObjectId, path: &str) -> RepositoryResult<()> {
        info!(path, "Recording invoice document");
        self.store.set_fields(id, doc! { "invoice_file": path }).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn set_is_sent(&self, id: ObjectId, is_sent: bool) -> RepositoryResult<()> {
        info!(is_sent, "Updating invoice sent flag");
        self.store.set_fields(id, doc! { "is_sent": is_sent }).await
    }

    #[instrument(skip(self), fields(quote_id = %quote_id))]
    async fn delete_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<u64> {
        info!("Deleting invoices of quote");
        self.store.delete_many(doc! { "quote_id": quote_id }).await
    }

    #[instrument(skip(self))]
    async fn list(&self, page: u32, limit: u32) -> RepositoryResult<Vec<Invoice>> {
        info!("Listing invoices");
        self.store.find_many(doc! {}, Some((page, limit))).await
    }
}

pub struct InMemoryInvoiceRepository {
    table: MemoryTable<Invoice>,
}

impl InMemoryInvoiceRepository {
    pub fn new() -> Self {
        Self { table: MemoryTable::new("Invoice") }
    }
}

impl Default for InMemoryInvoiceRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryInvoiceRepository {
    async fn create(&self, invoice: Invoice) -> RepositoryResult<Invoice> {
        self.table.insert(invoice).await
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Invoice> {
        self.table.get(id).await
    }

    async fn find_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<Option<Invoice>> {
        Ok(self.table.find_one(|invoice| invoice.quote_id == quote_id).await)
    }

    async fn update(&self, invoice: Invoice) -> RepositoryResult<Invoice> {
        self.table.replace(invoice).await
    }

    async fn set_invoice_file(&self, id: ObjectId, path: &str) -> RepositoryResult<()> {
        let path = path.to_string();
        self.table
            .modify(id, |invoice| invoice.invoice_file = Some(path))
            .await
            .map(|_| ())
    }

    async fn set_is_sent(&self, id: ObjectId, is_sent: bool) -> RepositoryResult<()> {
        self.table.modify(id, |invoice| invoice.is_sent = is_sent).await.map(|_| ())
    }

    async fn delete_by_quote(&self, quote_id: ObjectId) -> RepositoryResult<u64> {
        Ok(self.table.delete_many(|invoice| invoice.quote_id == quote_id).await)
    }

    async fn list(&self, page: u32, limit: u32) -> RepositoryResult<Vec<Invoice>> {
        Ok(self.table.find_many(|_| true, Some((page, limit))).await)
    }
}
