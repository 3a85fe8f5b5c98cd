//! Active-role context and permission gate.
//!
//! The session is the single owner of the process-wide role. Login sets it
//! and persists it through the [`RoleStore`] port, logout clears both, and an
//! unset role denies every capability.

use std::sync::{Arc, RwLock};

use cmms_core::{AppError, AppResult};
use cmms_domain::{Capability, PermissionSet, Role, has_permission};
use tracing::{info, warn};

use crate::RoleStore;

/// Application-context value holding the active role.
#[derive(Clone)]
pub struct RoleSession {
    store: Arc<dyn RoleStore>,
    active: Arc<RwLock<Option<Role>>>,
}

impl RoleSession {
    /// Creates a logged-out session backed by `store`.
    #[must_use]
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self {
            store,
            active: Arc::new(RwLock::new(None)),
        }
    }

    /// Restores the persisted role, if any, into this session.
    pub async fn restore(&self) -> AppResult<Option<Role>> {
        let role = self.store.load().await?;
        self.set_active(role);

        if let Some(role) = role {
            info!(role = %role, "restored persisted role");
        }

        Ok(role)
    }

    /// Activates `role` and persists it.
    pub async fn login(&self, role: Role) -> AppResult<()> {
        self.store.save(role).await?;
        self.set_active(Some(role));
        info!(role = %role, "role session started");
        Ok(())
    }

    /// Clears the active role and its persisted copy.
    ///
    /// The in-memory role is cleared first so a failing store still leaves
    /// the session denying everything.
    pub async fn logout(&self) -> AppResult<()> {
        let previous = self.active_role();
        self.set_active(None);

        if let Err(error) = self.store.clear().await {
            warn!(error = %error, "failed to clear persisted role");
            return Err(error);
        }

        if let Some(role) = previous {
            info!(role = %role, "role session ended");
        }

        Ok(())
    }

    /// Returns the active role.
    #[must_use]
    pub fn active_role(&self) -> Option<Role> {
        match self.active.read() {
            Ok(role) => *role,
            Err(_) => None,
        }
    }

    /// Returns whether a role is active.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.active_role().is_some()
    }

    /// Returns whether the active role grants `capability`.
    #[must_use]
    pub fn has_permission(&self, capability: Capability) -> bool {
        has_permission(self.active_role(), capability)
    }

    /// Returns the full capability set of the active role.
    #[must_use]
    pub fn permissions(&self) -> PermissionSet {
        self.active_role()
            .map(|role| role.permissions())
            .unwrap_or_else(PermissionSet::none)
    }

    /// Fails unless the active role grants `capability`.
    pub fn require(&self, capability: Capability) -> AppResult<()> {
        match self.active_role() {
            None => Err(AppError::Unauthorized("no active role".to_owned())),
            Some(role) if !role.permissions().allows(capability) => Err(AppError::Forbidden(
                format!("role '{role}' lacks '{}'", capability.as_str()),
            )),
            Some(_) => Ok(()),
        }
    }

    fn set_active(&self, role: Option<Role>) {
        match self.active.write() {
            Ok(mut active) => *active = role,
            Err(poisoned) => *poisoned.into_inner() = role,
        }
    }
}
