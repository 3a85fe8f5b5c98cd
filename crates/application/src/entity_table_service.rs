//! Generic entity table controller.
//!
//! One controller drives one [`EntityBinding`] against the REST collection
//! it names. Every mutation is followed by a full re-fetch, remote failures
//! are folded into a table-local error message, and the permission gate
//! decides which affordances the active role sees.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::NaiveDate;
use cmms_core::{AppError, AppResult};
use cmms_domain::{Capability, EntityBinding, EntityBindingKind, EntityRecord};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::csv_codec::{export_csv, export_file_name, import_csv};
use crate::form_draft::{FormDraft, RenderedField};
use crate::options_resolver::{OptionsResolver, ResolvedOptions};
use crate::role_session::RoleSession;
use crate::{ConfirmationPrompt, EntityCollectionApi};

mod editing;
mod mutations;
mod snapshot;

#[cfg(test)]
mod tests;

/// Question asked before a row is deleted.
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this item?";

/// Result of one controller action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    /// The action completed and state was updated.
    Applied,
    /// The user declined the confirmation prompt.
    Declined,
    /// The active role lacks the capability; nothing was dispatched.
    Denied,
    /// Required fields are empty; nothing was dispatched.
    Incomplete {
        /// Labels of the empty required fields.
        missing: Vec<String>,
    },
    /// There was nothing to submit.
    Idle,
    /// The remote call failed with the table-local message.
    Failed(String),
    /// The response arrived after unmount and was discarded.
    Detached,
}

/// Generated CSV download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// Suggested file name.
    pub file_name: String,
    /// CSV text.
    pub content: String,
}

/// Actions the active role may take on this table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableAffordances {
    /// `Add New` button and creation form.
    pub create: bool,
    /// `Import CSV` button.
    pub import: bool,
    /// `Export CSV` button is enabled.
    pub export: bool,
    /// Per-row edit action.
    pub edit: bool,
    /// Per-row delete action.
    pub delete: bool,
    /// Actions column is shown.
    pub actions: bool,
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Row identifier, when the record carries one.
    pub id: Option<String>,
    /// Cell texts in column order.
    pub cells: Vec<String>,
    /// Whether the row shows the edit buffer.
    pub editing: bool,
}

/// Render snapshot of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    /// Page title.
    pub title: String,
    /// Page subtitle.
    pub subtitle: String,
    /// Column headers.
    pub headers: Vec<String>,
    /// Rows in fetch order.
    pub rows: Vec<TableRow>,
    /// Actions granted to the active role.
    pub affordances: TableAffordances,
    /// Table-local error message.
    pub error: Option<String>,
    /// Last success notice.
    pub notice: Option<String>,
    /// Creation form fields while the form is open.
    pub create_form: Option<Vec<RenderedField>>,
}

#[derive(Debug, Clone)]
struct EditSession {
    id: String,
    buffer: EntityRecord,
}

#[derive(Debug, Default)]
struct TableState {
    records: Vec<EntityRecord>,
    options: ResolvedOptions,
    draft: FormDraft,
    creating: bool,
    editing: Option<EditSession>,
    error: Option<String>,
    notice: Option<String>,
}

/// Controller for one entity table.
pub struct EntityTableController {
    binding: Arc<EntityBinding>,
    api: Arc<dyn EntityCollectionApi>,
    prompt: Arc<dyn ConfirmationPrompt>,
    session: RoleSession,
    resolver: OptionsResolver,
    state: Mutex<TableState>,
    detached: AtomicBool,
    generation: AtomicU64,
}

impl EntityTableController {
    /// Creates a controller for `binding`.
    #[must_use]
    pub fn new(
        binding: Arc<EntityBinding>,
        api: Arc<dyn EntityCollectionApi>,
        prompt: Arc<dyn ConfirmationPrompt>,
        session: RoleSession,
    ) -> Self {
        let resolver = OptionsResolver::new(api.clone());

        Self {
            binding,
            api,
            prompt,
            session,
            resolver,
            state: Mutex::new(TableState::default()),
            detached: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns the bound entity.
    #[must_use]
    pub fn binding(&self) -> &EntityBinding {
        &self.binding
    }

    /// Loads the records and the creation-form options.
    ///
    /// Each mount starts a new generation; responses to requests issued
    /// under an earlier one are discarded.
    pub async fn mount(&self) -> TableOutcome {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.detached.store(false, Ordering::SeqCst);
        let outcome = self.list().await;
        self.refresh_options().await;
        outcome
    }

    /// Detaches the controller; responses arriving later are discarded.
    pub fn unmount(&self) {
        self.detached.store(true, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        debug!(collection = %self.binding.collection(), "entity table unmounted");
    }

    /// Returns whether the controller has been unmounted.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Whether a response to a request issued under `generation` must be dropped.
    fn is_stale(&self, generation: u64) -> bool {
        self.is_detached() || self.generation() != generation
    }

    /// Fetches every record, replacing the loaded list on success.
    ///
    /// A failure keeps the previous rows and records
    /// `Failed to fetch data: <message>`.
    pub async fn list(&self) -> TableOutcome {
        if !self.allowed(Capability::ViewEntities) {
            return TableOutcome::Denied;
        }

        let collection = self.binding.collection();
        let generation = self.generation();
        let result = self.api.list(collection).await;
        if self.is_stale(generation) {
            debug!(collection = %collection, "discarding fetch response after unmount");
            return TableOutcome::Detached;
        }

        let mut state = self.state.lock().await;
        match result {
            Ok(records) => {
                debug!(collection = %collection, records = records.len(), "entity table refreshed");
                state.records = records;
                state.error = None;
                TableOutcome::Applied
            }
            Err(error) => {
                let message = format!("Failed to fetch data: {}", error.message());
                warn!(collection = %collection, error = %error, "entity table fetch failed");
                state.error = Some(message.clone());
                TableOutcome::Failed(message)
            }
        }
    }

    /// Re-resolves the options of the creation form.
    pub async fn refresh_options(&self) {
        let generation = self.generation();
        let resolved = self.resolver.resolve(self.binding.form()).await;
        if self.is_stale(generation) {
            return;
        }

        self.state.lock().await.options = resolved;
    }

    /// Returns a copy of the loaded records.
    pub async fn records(&self) -> Vec<EntityRecord> {
        self.state.lock().await.records.clone()
    }

    /// Returns the table-local error message.
    pub async fn error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    /// Returns the last success notice.
    pub async fn notice(&self) -> Option<String> {
        self.state.lock().await.notice.clone()
    }

    /// Builds the CSV download of the loaded records.
    ///
    /// Columns of the binding select the exported keys; a binding without
    /// columns exports the union of record keys in first-seen order. An
    /// empty table records `No data to export` and produces nothing.
    pub async fn export_all(&self, date: NaiveDate) -> Option<CsvExport> {
        let mut state = self.state.lock().await;
        if state.records.is_empty() {
            state.error = Some("No data to export".to_owned());
            return None;
        }

        let columns: Vec<(String, String)> = if self.binding.columns().is_empty() {
            let mut keys: Vec<String> = Vec::new();
            for key in state.records.iter().flat_map(EntityRecord::keys) {
                if !keys.iter().any(|known| known == key) {
                    keys.push(key.to_owned());
                }
            }
            keys.into_iter().map(|key| (key.clone(), key)).collect()
        } else {
            self.binding
                .columns()
                .iter()
                .map(|column| (column.key().to_owned(), column.label().to_owned()))
                .collect()
        };

        let export = CsvExport {
            file_name: export_file_name(self.binding.collection(), date),
            content: export_csv(&state.records, &columns),
        };
        info!(
            collection = %self.binding.collection(),
            records = state.records.len(),
            file_name = %export.file_name,
            "entity table exported"
        );

        Some(export)
    }

    fn allowed(&self, capability: Capability) -> bool {
        match self.session.require(capability) {
            Ok(()) => true,
            Err(error) => {
                debug!(
                    collection = %self.binding.collection(),
                    capability = capability.as_str(),
                    error = %error,
                    "action refused by permission gate"
                );
                false
            }
        }
    }

    fn allowed_update(&self) -> bool {
        self.binding.kind().supports_update() && self.allowed(Capability::Update)
    }

    fn allowed_delete(&self) -> bool {
        self.binding.kind().supports_delete() && self.allowed(Capability::Delete)
    }
}
