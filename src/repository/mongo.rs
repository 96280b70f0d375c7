use bson::{doc, oid::ObjectId, Document};
use futures::stream::StreamExt;
use mongodb::{
    options::{ClientOptions, Credential, FindOptions},
    Client, Collection, Database,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use tracing::{debug, error, info, instrument};

use crate::config::MongoConfig;
use crate::model::Entity;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Opens a client from `MongoConfig` and returns the configured database.
#[instrument(skip(config), fields(database = %config.database))]
pub async fn connect(config: &MongoConfig) -> RepositoryResult<Database> {
    info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(&config.uri).await.map_err(|e| {
        error!("Failed to parse MongoDB URI: {}", e);
        RepositoryError::connection(format!("Invalid MongoDB URI: {}", e))
    })?;
    client_options.app_name = Some(config.app_name.clone());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(std::time::Duration::from_secs(config.connection_timeout_secs));

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client_options.credential = Some(
            Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build(),
        );
    }

    let client = Client::with_options(client_options)?;
    let db = client.database(&config.database);

    db.run_command(doc! { "ping": 1 }, None).await.map_err(|e| {
        error!("MongoDB ping failed: {}", e);
        RepositoryError::connection(format!("MongoDB ping failed: {}", e))
    })?;

    info!("Connected to MongoDB");
    Ok(db)
}

/// Typed collection with the CRUD calls every Mongo repository shares.
pub struct MongoStore<T: Send + Sync> {
    collection: Collection<T>,
    label: &'static str,
}

impl<T> MongoStore<T>
where
    T: Entity + Serialize + DeserializeOwned + Unpin + Debug,
{
    pub fn new(db: &Database, collection: &str, label: &'static str) -> Self {
        MongoStore {
            collection: db.collection::<T>(collection),
            label,
        }
    }

    pub async fn insert(&self, mut entity: T) -> RepositoryResult<T> {
        entity.set_id(ObjectId::new());
        match self.collection.insert_one(&entity, None).await {
            Ok(_) => {
                info!("{} created successfully", self.label);
                Ok(entity)
            }
            Err(e) => {
                error!("Failed to create {}: {}", self.label, e);
                Err(RepositoryError::from(e))
            }
        }
    }

    pub async fn find_one(&self, filter: Document) -> RepositoryResult<Option<T>> {
        self.collection.find_one(filter, None).await.map_err(|e| {
            error!("Failed to fetch {}: {}", self.label, e);
            RepositoryError::database(format!("Failed to fetch {}: {}", self.label, e))
        })
    }

    pub async fn get(&self, id: ObjectId) -> RepositoryResult<T> {
        match self.find_one(doc! { "_id": id }).await? {
            Some(entity) => Ok(entity),
            None => {
                error!("{} not found for ID: {}", self.label, id);
                Err(RepositoryError::not_found(format!("{} not found for ID: {}", self.label, id)))
            }
        }
    }

    /// Matching documents in insertion order; `page` is 1-based.
    pub async fn find_many(&self, filter: Document, page: Option<(u32, u32)>) -> RepositoryResult<Vec<T>> {
        let mut options = FindOptions::builder().sort(doc! { "_id": 1 }).build();
        if let Some((page, limit)) = page {
            options.skip = Some(u64::from(page.saturating_sub(1)) * u64::from(limit));
            options.limit = Some(i64::from(limit));
        }

        let mut cursor = self.collection.find(filter, options).await.map_err(|e| {
            error!("Failed to list {}: {}", self.label, e);
            RepositoryError::database(format!("Failed to list {}: {}", self.label, e))
        })?;

        let mut entities = Vec::new();
        while let Some(entity) = cursor.next().await {
            match entity {
                Ok(entity) => entities.push(entity),
                Err(e) => {
                    error!("Failed to deserialize {}: {}", self.label, e);
                    return Err(RepositoryError::serialization(format!(
                        "Failed to deserialize {}: {}",
                        self.label, e
                    )));
                }
            }
        }
        debug!("Fetched {} {} records", entities.len(), self.label);
        Ok(entities)
    }

    /// Writes every field except `_id`.
    pub async fn replace(&self, entity: T) -> RepositoryResult<T> {
        let id = entity
            .id()
            .ok_or_else(|| RepositoryError::validation(format!("{} has no id", self.label)))?;
        let mut fields = bson::to_document(&entity)?;
        fields.remove("_id");
        self.set_fields(id, fields).await?;
        Ok(entity)
    }

    /// Targeted `$set` of the given fields.
    pub async fn set_fields(&self, id: ObjectId, fields: Document) -> RepositoryResult<()> {
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": fields }, None)
            .await;
        match result {
            Ok(update) if update.matched_count > 0 => Ok(()),
            Ok(_) => {
                error!("No {} found to update for ID: {}", self.label, id);
                Err(RepositoryError::not_found(format!("No {} found to update for ID: {}", self.label, id)))
            }
            Err(e) => {
                error!("Failed to update {}: {}", self.label, e);
                Err(RepositoryError::database(format!("Failed to update {}: {}", self.label, e)))
            }
        }
    }

    pub async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        match self.collection.delete_one(doc! { "_id": id }, None).await {
            Ok(result) if result.deleted_count > 0 => Ok(()),
            Ok(_) => {
                error!("No {} found to delete for ID: {}", self.label, id);
                Err(RepositoryError::not_found(format!("No {} found to delete for ID: {}", self.label, id)))
            }
            Err(e) => {
                error!("Failed to delete {}: {}", self.label, e);
                Err(RepositoryError::database(format!("Failed to delete {}: {}", self.label, e)))
            }
        }
    }

    pub async fn delete_many(&self, filter: Document) -> RepositoryResult<u64> {
        match self.collection.delete_many(filter, None).await {
            Ok(result) => Ok(result.deleted_count),
            Err(e) => {
                error!("Failed to delete {} records: {}", self.label, e);
                Err(RepositoryError::database(format!("Failed to delete {} records: {}", self.label, e)))
            }
        }
    }

    pub async fn count(&self, filter: Document) -> RepositoryResult<u64> {
        self.collection.count_documents(filter, None).await.map_err(|e| {
            error!("Failed to count {}: {}", self.label, e);
            RepositoryError::database(format!("Failed to count {}: {}", self.label, e))
        })
    }
}

/// BSON value of a serde-encoded enum or scalar, for use inside `$set`.
pub fn to_bson_value<V: Serialize>(value: &V) -> RepositoryResult<bson::Bson> {
    Ok(bson::to_bson(value)?)
}
