use super::*;

impl EntityTableController {
    /// Starts editing the row identified by `id`, copying it into a buffer.
    pub async fn start_edit(&self, id: &str) -> AppResult<()> {
        if !self.allowed_update() {
            return Err(AppError::Forbidden(format!(
                "rows of '{}' cannot be edited by the active role",
                self.binding.collection()
            )));
        }

        let mut state = self.state.lock().await;
        let buffer = state
            .records
            .iter()
            .find(|record| self.binding.record_id(record).as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "{} '{id}' is not loaded",
                    self.binding.display_name()
                ))
            })?;

        state.editing = Some(EditSession {
            id: id.to_owned(),
            buffer,
        });
        Ok(())
    }

    /// Sets one value of the edit buffer.
    ///
    /// Constrained choices accept a listed option by value or label and
    /// store the option value. Remote selects draw their options from the
    /// resolved reference data, and dependent cascades are filtered by the
    /// parent value held in the buffer. Other fields store the text as typed.
    pub async fn set_edit_value(&self, name: &str, text: &str) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let TableState {
            editing, options, ..
        } = &mut *state;
        let session = editing
            .as_mut()
            .ok_or_else(|| AppError::Validation("no row is being edited".to_owned()))?;

        let value = self.edit_value(&session.buffer, options, name, text)?;
        session.buffer.insert(name, value)
    }

    /// Leaves edit mode without sending anything.
    pub async fn cancel_edit(&self) {
        self.state.lock().await.editing = None;
    }

    /// Returns the id of the row being edited.
    pub async fn editing_id(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .editing
            .as_ref()
            .map(|session| session.id.clone())
    }

    /// Sends the edit buffer for the row being edited.
    pub async fn save_edit(&self) -> TableOutcome {
        let session = self.state.lock().await.editing.clone();
        match session {
            Some(session) => self.update(&session.id, &session.buffer).await,
            None => TableOutcome::Idle,
        }
    }

    fn edit_value(
        &self,
        buffer: &EntityRecord,
        resolved: &ResolvedOptions,
        name: &str,
        text: &str,
    ) -> AppResult<Value> {
        let Some(field) = self
            .binding
            .form()
            .field(name)
            .filter(|field| field.is_constrained_choice())
        else {
            return Ok(Value::String(text.to_owned()));
        };
        if text.is_empty() {
            return Ok(Value::String(String::new()));
        }

        let options = FormDraft::from_values(buffer.clone()).options_for(field, resolved);
        options
            .iter()
            .find(|option| option.value_text() == text)
            .or_else(|| options.iter().find(|option| option.label == text))
            .map(|option| option.value.clone())
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "'{text}' is not a valid choice for '{}'",
                    field.label()
                ))
            })
    }
}
