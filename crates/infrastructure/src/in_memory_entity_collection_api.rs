use std::collections::HashMap;

use async_trait::async_trait;
use cmms_application::{EntityCollectionApi, MutationReceipt};
use cmms_core::{AppError, AppResult};
use cmms_domain::{EntityBindingKind, EntityCatalog, EntityRecord};
use serde_json::Value;
use tokio::sync::RwLock;


#[derive(Debug)]
struct StoredCollection {
    display_name: String,
    id_field: String,
    kind: EntityBindingKind,
    required: Vec<String>,
    records: Vec<EntityRecord>,
}

impl StoredCollection {
    fn insert(&mut self, mut record: EntityRecord) -> AppResult<()> {
        if record.is_empty() {
            return Err(AppError::Validation("No data provided".to_owned()));
        }

        match self.kind {
            EntityBindingKind::Managed => self.insert_managed(&mut record)?,
            EntityBindingKind::Relationship => self.insert_link(&record)?,
        }

        self.records.push(record);
        Ok(())
    }

    fn insert_managed(&self, record: &mut EntityRecord) -> AppResult<()> {
        match record.text(&self.id_field).filter(|id| !id.is_empty()) {
            Some(id) => {
                if self.position(&id).is_some() {
                    return Err(AppError::Conflict(format!(
                        "{} with ID '{id}' already exists",
                        self.display_name
                    )));
                }
            }
            None => {
                let next_id = self
                    .records
                    .iter()
                    .filter_map(|existing| existing.get(&self.id_field).and_then(Value::as_u64))
                    .max()
                    .unwrap_or(0)
                    + 1;
                record.insert(self.id_field.clone(), Value::from(next_id))?;
            }
        }

        Ok(())
    }

    fn insert_link(&self, record: &EntityRecord) -> AppResult<()> {
        let missing: Vec<&str> = self
            .required
            .iter()
            .filter(|field| !record.has_value(field))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let duplicate = self.records.iter().any(|existing| {
            self.required
                .iter()
                .all(|field| existing.text(field) == record.text(field))
        });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "{} already exists",
                self.display_name
            )));
        }

        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.text(&self.id_field).as_deref() == Some(id))
    }

    fn created_message(&self) -> String {
        match self.kind {
            EntityBindingKind::Managed => format!("{} created", self.display_name),
            EntityBindingKind::Relationship => format!("{} added", self.display_name),
        }
    }
}

/// In-memory implementation of the REST collection contract.
///
/// Collections are registered from an [`EntityCatalog`]. Managed collections
/// key rows by their id field and assign the next numeric id when a created
/// record has none; relationship collections reject incomplete and
/// duplicate links.
#[derive(Debug)]
pub struct InMemoryEntityCollectionApi {
    collections: RwLock<HashMap<String, StoredCollection>>,
}

impl InMemoryEntityCollectionApi {
    /// Creates an empty store with one collection per catalog binding.
    #[must_use]
    pub fn new(catalog: &EntityCatalog) -> Self {
        let collections = catalog
            .bindings()
            .iter()
            .map(|binding| {
                let stored = StoredCollection {
                    display_name: binding.display_name().to_owned(),
                    id_field: binding.id_field().to_owned(),
                    kind: binding.kind(),
                    required: binding
                        .form()
                        .fields()
                        .iter()
                        .filter(|field| field.is_required())
                        .map(|field| field.name().to_owned())
                        .collect(),
                    records: Vec::new(),
                };
                (binding.collection().to_owned(), stored)
            })
            .collect();

        Self {
            collections: RwLock::new(collections),
        }
    }

    /// Inserts `records` as if each had been created, returning the count.
    pub async fn seed(&self, collection: &str, records: Vec<EntityRecord>) -> AppResult<usize> {
        let count = records.len();
        self.insert_batch(collection, records).await?;
        Ok(count)
    }

    /// Returns whether `collection` is registered.
    pub async fn supports(&self, collection: &str) -> bool {
        self.collections.read().await.contains_key(collection)
    }

    async fn insert_batch(&self, collection: &str, records: Vec<EntityRecord>) -> AppResult<()> {
        let mut collections = self.collections.write().await;
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| unsupported(collection))?;

        let snapshot = stored.records.clone();
        for record in records {
            if let Err(error) = stored.insert(record) {
                stored.records = snapshot;
                return Err(error);
            }
        }

        Ok(())
    }
}

fn unsupported(collection: &str) -> AppError {
    AppError::Validation(format!("Unsupported entity: {collection}"))
}

fn unknown(collection: &str) -> AppError {
    AppError::NotFound(format!("Unknown entity: {collection}"))
}

#[async_trait]
impl EntityCollectionApi for InMemoryEntityCollectionApi {
    async fn list(&self, collection: &str) -> AppResult<Vec<EntityRecord>> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|stored| stored.records.clone())
            .ok_or_else(|| unknown(collection))
    }

    async fn create(&self, collection: &str, record: &EntityRecord) -> AppResult<MutationReceipt> {
        let mut collections = self.collections.write().await;
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| unknown(collection))?;

        stored.insert(record.clone())?;
        Ok(MutationReceipt::with_message(stored.created_message()))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &EntityRecord,
    ) -> AppResult<MutationReceipt> {
        let mut collections = self.collections.write().await;
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| unknown(collection))?;

        if !stored.kind.supports_update() {
            return Err(AppError::Validation(format!(
                "{} links cannot be updated",
                stored.display_name
            )));
        }

        let mut patch = patch.clone();
        patch.remove(&stored.id_field);
        if patch.is_empty() {
            return Err(AppError::Validation("No fields to update".to_owned()));
        }

        let index = stored
            .position(id)
            .ok_or_else(|| AppError::NotFound(format!("{} not found", stored.display_name)))?;
        stored.records[index].merge(&patch);

        Ok(MutationReceipt::with_message(format!(
            "{} updated",
            stored.display_name
        )))
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<MutationReceipt> {
        let mut collections = self.collections.write().await;
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| unknown(collection))?;

        if !stored.kind.supports_delete() {
            return Err(AppError::Validation(format!(
                "{} links cannot be deleted",
                stored.display_name
            )));
        }

        let index = stored
            .position(id)
            .ok_or_else(|| AppError::NotFound(format!("{} not found", stored.display_name)))?;
        stored.records.remove(index);

        Ok(MutationReceipt::with_message(format!(
            "{} deleted",
            stored.display_name
        )))
    }

    async fn import(
        &self,
        collection: &str,
        items: &[EntityRecord],
    ) -> AppResult<MutationReceipt> {
        self.insert_batch(collection, items.to_vec()).await?;

        Ok(MutationReceipt::with_message(format!(
            "Successfully imported {} items",
            items.len()
        )))
    }
}
