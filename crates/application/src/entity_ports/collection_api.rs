use async_trait::async_trait;
use cmms_core::AppResult;
use cmms_domain::EntityRecord;
use serde::{Deserialize, Serialize};

/// Acknowledgement returned by a mutating collection call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationReceipt {
    /// Optional server message, e.g. `Location created`.
    pub message: Option<String>,
}

impl MutationReceipt {
    /// Creates a receipt carrying a server message.
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}

/// Port for the REST entity collections consumed by entity tables.
///
/// Failures carry the server's error text verbatim in the returned
/// [`cmms_core::AppError`]; transport failures use `AppError::Transport`.
#[async_trait]
pub trait EntityCollectionApi: Send + Sync {
    /// Lists every record of `collection`.
    async fn list(&self, collection: &str) -> AppResult<Vec<EntityRecord>>;

    /// Creates one record in `collection`.
    async fn create(&self, collection: &str, record: &EntityRecord) -> AppResult<MutationReceipt>;

    /// Applies `patch` to the record identified by `id`.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &EntityRecord,
    ) -> AppResult<MutationReceipt>;

    /// Deletes the record identified by `id`.
    async fn delete(&self, collection: &str, id: &str) -> AppResult<MutationReceipt>;

    /// Submits a bulk import batch tagged with `collection`.
    async fn import(
        &self,
        collection: &str,
        items: &[EntityRecord],
    ) -> AppResult<MutationReceipt>;
}
