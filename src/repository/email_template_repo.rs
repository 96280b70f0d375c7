use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use mongodb::Database;
use tracing::{info, instrument};

use crate::model::email_template::{EmailMessageTemplate, MessageType};
use crate::repository::memory::MemoryTable;
use crate::repository::mongo::{to_bson_value, MongoStore};
use crate::repository::repository_error::RepositoryResult;

#[async_trait]
pub trait EmailTemplateRepository: Send + Sync {
    async fn create(&self, template: EmailMessageTemplate) -> RepositoryResult<EmailMessageTemplate>;
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<EmailMessageTemplate>;
    async fn update(&self, template: EmailMessageTemplate) -> RepositoryResult<EmailMessageTemplate>;
    async fn list(&self) -> RepositoryResult<Vec<EmailMessageTemplate>>;
    /// First active template of the given type in storage order.
    async fn first_active(&self, message_type: MessageType) -> RepositoryResult<Option<EmailMessageTemplate>>;
}

pub struct MongoEmailTemplateRepository {
    store: MongoStore<EmailMessageTemplate>,
}

impl MongoEmailTemplateRepository {
    pub fn new(db: &Database) -> Self {
        Self { store: MongoStore::new(db, "email_templates", "Email template") }
    }
}

#[async_trait]
impl EmailTemplateRepository for MongoEmailTemplateRepository {
    #[instrument(skip(self, template), fields(message_type = %template.message_type))]
    async fn create(&self, template: EmailMessageTemplate) -> RepositoryResult<EmailMessageTemplate> {
        info!("Creating email template");
        self.store.insert(template).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<EmailMessageTemplate> {
        info!("Fetching email template by ID");
        self.store.get(id).await
    }

    #[instrument(skip(self, template), fields(id = ?template.id))]
    async fn update(&self, template: EmailMessageTemplate) -> RepositoryResult<EmailMessageTemplate> {
        info!("Updating email template");
        self.store.replace(template).await
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepositoryResult<Vec<EmailMessageTemplate>> {
        info!("Listing email templates");
        self.store.find_many(doc! {}, None).await
    }

    #[instrument(skip(self), fields(message_type = %message_type))]
    async fn first_active(&self, message_type: MessageType) -> RepositoryResult<Option<EmailMessageTemplate>> {
        info!("Resolving active email template");
        let filter = doc! { "message_type": to_bson_value(&message_type)?, "is_active": true };
        Ok(self.store.find_many(filter, Some((1, 1))).await?.into_iter().next())
    }
}

pub struct InMemoryEmailTemplateRepository {
    table: MemoryTable<EmailMessageTemplate>,
}

impl InMemoryEmailTemplateRepository {
    pub fn new() -> Self {
        Self { table: MemoryTable::new("Email template") }
    }
}

impl Default for InMemoryEmailTemplateRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailTemplateRepository for InMemoryEmailTemplateRepository {
    async fn create(&self, template: EmailMessageTemplate) -> RepositoryResult<EmailMessageTemplate> {
        self.table.insert(template).await
    }

    async fn get_by_id(&self, id: ObjectId) -> RepositoryResult<EmailMessageTemplate> {
        self.table.get(id).await
    }

    async fn update(&self, template: EmailMessageTemplate) -> RepositoryResult<EmailMessageTemplate> {
        self.table.replace(template).await
    }

    async fn list(&self) -> RepositoryResult<Vec<EmailMessageTemplate>> {
        Ok(self.table.find_many(|_| true, None).await)
    }

    async fn first_active(&self, message_type: MessageType) -> RepositoryResult<Option<EmailMessageTemplate>> {
        Ok(self
            .table
            .find_one(|t| t.message_type == message_type && t.is_active)
            .await)
    }
}
