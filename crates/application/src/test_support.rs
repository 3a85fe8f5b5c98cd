use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use cmms_core::{AppError, AppResult};
use cmms_domain::{EntityRecord, Role};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{ConfirmationPrompt, EntityCollectionApi, MutationReceipt, RoleStore};

pub(crate) fn record(value: Value) -> EntityRecord {
    EntityRecord::from_value(value).unwrap_or_else(|_| unreachable!())
}

/// Scriptable collection fake recording every call as `METHOD path`.
#[derive(Default)]
pub(crate) struct FakeCollectionApi {
    pub collections: Mutex<HashMap<String, Vec<EntityRecord>>>,
    pub failures: Mutex<HashMap<String, AppError>>,
    pub calls: Mutex<Vec<String>>,
    pub payloads: Mutex<Vec<EntityRecord>>,
}

impl FakeCollectionApi {
    pub(crate) fn with_collection(mut self, name: &str, records: Vec<EntityRecord>) -> Self {
        self.collections
            .get_mut()
            .insert(name.to_owned(), records);
        self
    }

    pub(crate) async fn fail(&self, call: &str, error: AppError) {
        self.failures.lock().await.insert(call.to_owned(), error);
    }

    pub(crate) async fn recover(&self, call: &str) {
        self.failures.lock().await.remove(call);
    }

    pub(crate) async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub(crate) async fn count(&self, call: &str) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|recorded| recorded.as_str() == call)
            .count()
    }

    async fn enter(&self, call: String) -> AppResult<()> {
        self.calls.lock().await.push(call.clone());
        match self.failures.lock().await.get(&call) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EntityCollectionApi for FakeCollectionApi {
    async fn list(&self, collection: &str) -> AppResult<Vec<EntityRecord>> {
        self.enter(format!("GET {collection}")).await?;
        Ok(self
            .collections
            .lock()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn create(&self, collection: &str, record: &EntityRecord) -> AppResult<MutationReceipt> {
        self.enter(format!("POST {collection}")).await?;
        self.payloads.lock().await.push(record.clone());
        self.collections
            .lock()
            .await
            .entry(collection.to_owned())
            .or_default()
            .push(record.clone());
        Ok(MutationReceipt::with_message("created"))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &EntityRecord,
    ) -> AppResult<MutationReceipt> {
        self.enter(format!("PUT {collection}/{id}")).await?;
        self.payloads.lock().await.push(patch.clone());
        Ok(MutationReceipt::with_message("updated"))
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<MutationReceipt> {
        self.enter(format!("DELETE {collection}/{id}")).await?;
        Ok(MutationReceipt::with_message("deleted"))
    }

    async fn import(
        &self,
        collection: &str,
        items: &[EntityRecord],
    ) -> AppResult<MutationReceipt> {
        self.enter(format!("IMPORT {collection}")).await?;
        self.payloads.lock().await.extend(items.iter().cloned());
        Ok(MutationReceipt::with_message(format!(
            "Successfully imported {} items",
            items.len()
        )))
    }
}

/// Prompt returning a fixed answer and remembering whether it was asked.
pub(crate) struct FixedPrompt {
    answer: bool,
    asked: AtomicBool,
}

impl FixedPrompt {
    pub(crate) fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: AtomicBool::new(false),
        }
    }

    pub(crate) fn was_asked(&self) -> bool {
        self.asked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfirmationPrompt for FixedPrompt {
    async fn confirm(&self, _message: &str) -> bool {
        self.asked.store(true, Ordering::SeqCst);
        self.answer
    }
}

#[derive(Default)]
pub(crate) struct MemoryRoleStore {
    stored: Mutex<Option<Role>>,
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn load(&self) -> AppResult<Option<Role>> {
        Ok(*self.stored.lock().await)
    }

    async fn save(&self, role: Role) -> AppResult<()> {
        *self.stored.lock().await = Some(role);
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.stored.lock().await = None;
        Ok(())
    }
}
