use bson::oid::ObjectId;
use tokio::sync::RwLock;
use tracing::error;

use crate::model::Entity;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

/// Process-local table used by the `memory` storage backend and the test suite.
pub struct MemoryTable<T: Entity> {
    rows: RwLock<Vec<T>>,
    label: &'static str,
}

impl<T: Entity> MemoryTable<T> {
    pub fn new(label: &'static str) -> Self {
        MemoryTable {
            rows: RwLock::new(Vec::new()),
            label,
        }
    }

    pub async fn insert(&self, mut entity: T) -> RepositoryResult<T> {
        entity.set_id(ObjectId::new());
        self.rows.write().await.push(entity.clone());
        Ok(entity)
    }

    pub async fn get(&self, id: ObjectId) -> RepositoryResult<T> {
        self.find_one(|row| row.id() == Some(id))
            .await
            .ok_or_else(|| self.not_found(id))
    }

    pub async fn find_one<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows.read().await.iter().find(|row| predicate(row)).cloned()
    }

    pub async fn find_many<F>(&self, predicate: F, page: Option<(u32, u32)>) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        let rows = self.rows.read().await;
        let matching = rows.iter().filter(|row| predicate(row)).cloned();
        match page {
            Some((page, limit)) => matching
                .skip(page.saturating_sub(1) as usize * limit as usize)
                .take(limit as usize)
                .collect(),
            None => matching.collect(),
        }
    }

    pub async fn count<F>(&self, predicate: F) -> u64
    where
        F: Fn(&T) -> bool,
    {
        self.rows.read().await.iter().filter(|row| predicate(row)).count() as u64
    }

    pub async fn replace(&self, entity: T) -> RepositoryResult<T> {
        let id = entity
            .id()
            .ok_or_else(|| RepositoryError::validation(format!("{} has no id", self.label)))?;
        self.modify(id, |row| *row = entity.clone()).await?;
        Ok(entity)
    }

    /// Applies `change` to the row in place; the equivalent of a targeted `$set`.
    pub async fn modify<F>(&self, id: ObjectId, change: F) -> RepositoryResult<T>
    where
        F: FnOnce(&mut T),
    {
        let mut rows = self.rows.write().await;
        match rows.iter_mut().find(|row| row.id() == Some(id)) {
            Some(row) => {
                change(row);
                Ok(row.clone())
            }
            None => Err(self.not_found(id)),
        }
    }

    pub async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| row.id() != Some(id));
        if rows.len() == before {
            return Err(self.not_found(id));
        }
        Ok(())
    }

    pub async fn delete_many<F>(&self, predicate: F) -> u64
    where
        F: Fn(&T) -> bool,
    {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|row| !predicate(row));
        (before - rows.len()) as u64
    }

    fn not_found(&self, id: ObjectId) -> RepositoryError {
        error!("{} not found for ID: {}", self.label, id);
        RepositoryError::not_found(format!("{} not found for ID: {}", self.label, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::contact::Contact;

    fn contact(name: &str) -> Contact {
        Contact {
            id: None,
            first_name: name.to_string(),
            last_name: None,
            email: format!("{}@x.com", name),
            phone: None,
            subject: None,
            message: None,
            is_read: false,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_get_finds_it() {
        let table = MemoryTable::new("Contact");
        let saved = table.insert(contact("jane")).await.unwrap();
        let id = saved.id.unwrap();
        assert_eq!(table.get(id).await.unwrap().first_name, "jane");
    }

    #[tokio::test]
    async fn test_modify_and_delete_unknown_id() {
        let table: MemoryTable<Contact> = MemoryTable::new("Contact");
        let missing = ObjectId::new();
        assert!(matches!(table.modify(missing, |_| {}).await, Err(RepositoryError::NotFound(_))));
        assert!(matches!(table.delete(missing).await, Err(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_many_pages_in_insertion_order() {
        let table = MemoryTable::new("Contact");
        for name in ["a", "b", "c"] {
            table.insert(contact(name)).await.unwrap();
        }
        let page: Vec<String> = table
            .find_many(|_| true, Some((2, 2)))
            .await
            .into_iter()
            .map(|c| c.first_name)
            .collect();
        assert_eq!(page, vec!["c".to_string()]);
    }
}
