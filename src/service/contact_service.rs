use async_trait::async_trait;
use bson::oid::ObjectId;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::model::contact::Contact;
use crate::model::timestamp;
use crate::repository::contact_repo::ContactRepository;
use crate::util::error::ServiceError;

#[async_trait]
pub trait ContactService: Send + Sync {
    async fn submit(&self, contact: Contact) -> Result<Contact, ServiceError>;
    /// Returns the message and marks it read.
    async fn open(&self, id: ObjectId) -> Result<Contact, ServiceError>;
    /// Recomputed from storage on every call.
    async fn unread_count(&self) -> Result<u64, ServiceError>;
}

pub struct ContactServiceImpl {
    repo: Arc<dyn ContactRepository>,
}

impl ContactServiceImpl {
    pub fn new(repo: Arc<dyn ContactRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ContactService for ContactServiceImpl {
    #[instrument(skip(self, contact), fields(email = %contact.email))]
    async fn submit(&self, mut contact: Contact) -> Result<Contact, ServiceError> {
        info!("Submitting contact message");
        contact.id = None;
        contact.is_read = false;
        contact.created_at = Some(timestamp());
        self.repo.create(contact).await.map_err(|e| {
            error!("Failed to store contact message: {}", e);
            ServiceError::from(e)
        })
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn open(&self, id: ObjectId) -> Result<Contact, ServiceError> {
        info!("Opening contact message");
        let mut contact = self.repo.get_by_id(id).await?;
        if !contact.is_read {
            self.repo.mark_read(id).await?;
            contact.is_read = true;
        }
        Ok(contact)
    }

    #[instrument(skip(self))]
    async fn unread_count(&self) -> Result<u64, ServiceError> {
        info!("Counting unread contact messages");
        self.repo.count_unread().await.map_err(|e| {
            error!("Failed to count unread messages: {}", e);
            ServiceError::from(e)
        })
    }
}
