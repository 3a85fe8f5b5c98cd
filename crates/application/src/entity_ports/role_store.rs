use async_trait::async_trait;
use cmms_core::AppResult;
use cmms_domain::Role;

/// Persistence port for the active role, surviving process restarts.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Loads the persisted role, if any.
    async fn load(&self) -> AppResult<Option<Role>>;

    /// Persists `role` as the active role.
    async fn save(&self, role: Role) -> AppResult<()>;

    /// Removes the persisted role.
    async fn clear(&self) -> AppResult<()>;
}
