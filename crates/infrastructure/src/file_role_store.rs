use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cmms_application::RoleStore;
use cmms_core::{AppError, AppResult};
use cmms_domain::Role;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Serialize, Deserialize)]
struct StoredRole {
    role: String,
}

/// JSON file persistence for the active role.
///
/// A missing file means no role. An unreadable or unknown stored role is
/// logged and treated as no role.
#[derive(Debug, Clone)]
pub struct FileRoleStore {
    path: PathBuf,
}

impl FileRoleStore {
    /// Creates a store persisting to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RoleStore for FileRoleStore {
    async fn load(&self) -> AppResult<Option<Role>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(AppError::Internal(format!(
                    "failed to read role file '{}': {error}",
                    self.path.display()
                )));
            }
        };

        let role = serde_json::from_str::<StoredRole>(&contents)
            .map_err(|error| error.to_string())
            .and_then(|stored| stored.role.parse::<Role>().map_err(|error| error.to_string()));

        match role {
            Ok(role) => Ok(Some(role)),
            Err(error) => {
                warn!(path = %self.path.display(), error = %error, "ignoring invalid stored role");
                Ok(None)
            }
        }
    }

    async fn save(&self, role: Role) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to create role directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        let contents = serde_json::to_string(&StoredRole {
            role: role.as_str().to_owned(),
        })
        .map_err(|error| AppError::Internal(format!("failed to encode role: {error}")))?;

        tokio::fs::write(&self.path, contents).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to write role file '{}': {error}",
                self.path.display()
            ))
        })
    }

    async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(AppError::Internal(format!(
                "failed to remove role file '{}': {error}",
                self.path.display()
            ))),
        }
    }
}
