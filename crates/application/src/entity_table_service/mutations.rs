use super::*;

impl EntityTableController {
    /// Opens the creation form with an empty draft.
    pub async fn begin_create(&self) -> TableOutcome {
        if !self.allowed(Capability::Create) {
            return TableOutcome::Denied;
        }

        let mut state = self.state.lock().await;
        state.draft.clear();
        state.creating = true;
        TableOutcome::Applied
    }

    /// Closes the creation form, keeping the draft.
    pub async fn cancel_create(&self) {
        self.state.lock().await.creating = false;
    }

    /// Sets one creation-form value, applying the cascade rules.
    pub async fn set_draft_value(&self, name: &str, text: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let TableState { draft, options, .. } = &mut *state;
        draft.set_value(self.binding.form(), options, name, text)
    }

    /// Returns a copy of the creation draft.
    pub async fn draft(&self) -> FormDraft {
        self.state.lock().await.draft.clone()
    }

    /// Submits the creation draft.
    ///
    /// A draft with empty required fields dispatches nothing. On success the
    /// draft is cleared, the form closed and the table re-fetched; on failure
    /// the draft is kept and `Failed to create item: <message>` recorded
    /// (`Failed to create link: <message>` for relationship tables).
    pub async fn create(&self) -> TableOutcome {
        if !self.allowed(Capability::Create) {
            return TableOutcome::Denied;
        }

        let record = {
            let state = self.state.lock().await;
            let missing = state.draft.missing_required(self.binding.form());
            if !missing.is_empty() {
                debug!(
                    collection = %self.binding.collection(),
                    missing = ?missing,
                    "create refused with empty required fields"
                );
                return TableOutcome::Incomplete { missing };
            }
            state.draft.values().clone()
        };

        let generation = self.generation();
        let result = self.api.create(self.binding.collection(), &record).await;
        if self.is_stale(generation) {
            return TableOutcome::Detached;
        }

        match result {
            Ok(receipt) => {
                {
                    let mut state = self.state.lock().await;
                    state.draft.clear();
                    state.creating = false;
                    state.error = None;
                    state.notice = receipt.message;
                }
                info!(collection = %self.binding.collection(), "entity created");
                self.refetch_after_mutation().await
            }
            Err(error) => {
                let action = match self.binding.kind() {
                    EntityBindingKind::Managed => "Failed to create item",
                    EntityBindingKind::Relationship => "Failed to create link",
                };
                self.fail(action, &error).await
            }
        }
    }

    /// Sends `patch` for the row identified by `id`.
    ///
    /// Success leaves edit mode and re-fetches; failure keeps the edit
    /// session and records `Failed to update item: <message>`.
    pub async fn update(&self, id: &str, patch: &EntityRecord) -> TableOutcome {
        if !self.allowed_update() {
            return TableOutcome::Denied;
        }

        let generation = self.generation();
        let result = self.api.update(self.binding.collection(), id, patch).await;
        if self.is_stale(generation) {
            return TableOutcome::Detached;
        }

        match result {
            Ok(receipt) => {
                {
                    let mut state = self.state.lock().await;
                    state.editing = None;
                    state.error = None;
                    state.notice = receipt.message;
                }
                info!(collection = %self.binding.collection(), id = %id, "entity updated");
                self.refetch_after_mutation().await
            }
            Err(error) => self.fail("Failed to update item", &error).await,
        }
    }

    /// Deletes the row identified by `id` after confirmation.
    pub async fn remove(&self, id: &str) -> TableOutcome {
        if !self.allowed_delete() {
            return TableOutcome::Denied;
        }

        if !self.prompt.confirm(DELETE_CONFIRMATION).await {
            debug!(collection = %self.binding.collection(), id = %id, "delete declined");
            return TableOutcome::Declined;
        }

        let generation = self.generation();
        let result = self.api.delete(self.binding.collection(), id).await;
        if self.is_stale(generation) {
            return TableOutcome::Detached;
        }

        match result {
            Ok(receipt) => {
                {
                    let mut state = self.state.lock().await;
                    state.error = None;
                    state.notice = receipt.message;
                }
                info!(collection = %self.binding.collection(), id = %id, "entity deleted");
                self.refetch_after_mutation().await
            }
            Err(error) => self.fail("Failed to delete item", &error).await,
        }
    }

    /// Submits a decoded batch to the bulk-import endpoint.
    pub async fn import_batch(&self, items: Vec<EntityRecord>) -> TableOutcome {
        if !self.allowed(Capability::Create) {
            return TableOutcome::Denied;
        }

        let count = items.len();
        let generation = self.generation();
        let result = self.api.import(self.binding.collection(), &items).await;
        if self.is_stale(generation) {
            return TableOutcome::Detached;
        }

        match result {
            Ok(_) => {
                {
                    let mut state = self.state.lock().await;
                    state.error = None;
                    state.notice = Some(format!("Successfully imported {count} items."));
                }
                info!(collection = %self.binding.collection(), items = count, "entity batch imported");
                self.refetch_after_mutation().await
            }
            Err(error) => self.fail("Failed to import", &error).await,
        }
    }

    /// Decodes uploaded CSV text and submits it as one import batch.
    pub async fn import_csv(&self, text: &str) -> TableOutcome {
        self.import_batch(import_csv(text)).await
    }

    /// Re-fetches after a successful mutation.
    ///
    /// The mutation outcome stays `Applied`; a failing re-fetch only leaves
    /// its message on the table.
    async fn refetch_after_mutation(&self) -> TableOutcome {
        match self.list().await {
            TableOutcome::Detached => TableOutcome::Detached,
            _ => TableOutcome::Applied,
        }
    }

    async fn fail(&self, action: &str, error: &AppError) -> TableOutcome {
        let message = format!("{action}: {}", error.message());
        warn!(collection = %self.binding.collection(), error = %error, "{action}");
        self.state.lock().await.error = Some(message.clone());
        TableOutcome::Failed(message)
    }
}
