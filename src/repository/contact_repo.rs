use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use tracing::{info, instrument};

use crate::model::contact::Contact;
use crate::repository::memory::MemoryTable;
use crate::repository::mongo::MongoStore;
use crate::repository::repository_error::RepositoryResult;

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn create(&self, contact: Contact) -> RepositoryResult<Contact>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Contact>;
    async fn mark_read(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn count_unread(&self) -> RepositoryResult<u64>;
}

pub struct MongoContactRepository {
    store: MongoStore<Contact>,
}

impl MongoContactRepository {
    pub fn new(db: &Database) -> Self {
        Self { store: MongoStore::new(db, "contacts", "Contact") }
    }
}

#[async_trait]
impl ContactRepository for MongoContactRepository {
    #[instrument(skip(self, contact), fields(email = %contact.email))]
    async fn create(&self, contact: Contact) -> RepositoryResult<Contact> {
        info!("Creating contact message");
        self.store.insert(contact).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Contact> {
        info!("Fetching contact message by ID");
        self.store.get(id).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn mark_read(&self, id: ObjectId) -> RepositoryResult<()> {
        info!("Marking contact message read");
        self.store.set_fields(id, doc! { "is_read": true }).await
    }

    #[instrument(skip(self))]
    async fn count_unread(&self) -> RepositoryResult<u64> {
        info!("Counting unread contact messages");
        self.store.count(doc! { "is_read": false }).await
    }
}

pub struct InMemoryContactRepository {
    table: MemoryTable<Contact>,
}

impl InMemoryContactRepository {
    pub fn new() -> Self {
        Self { table: MemoryTable::new("Contact") }
    }
}

impl Default for InMemoryContactRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn create(&self, contact: Contact) -> RepositoryResult<Contact> {
        self.table.insert(contact).await
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<Contact> {
        self.table.get(id).await
    }

    async fn mark_read(&self, id: ObjectId) -> RepositoryResult<()> {
        self.table.modify(id, |contact| contact.is_read = true).await.map(|_| ())
    }

    async fn count_unread(&self) -> RepositoryResult<u64> {
        Ok(self.table.count(|contact| !contact.is_read).await)
    }
}
