use super::*;

impl EntityTableController {
    /// Returns the actions the active role may take on this table.
    pub async fn affordances(&self) -> TableAffordances {
        let has_records = !self.state.lock().await.records.is_empty();
        self.affordances_for(has_records)
    }

    /// Builds a render snapshot of the table.
    pub async fn view(&self) -> TableView {
        let state = self.state.lock().await;
        let affordances = self.affordances_for(!state.records.is_empty());
        let editing = state.editing.as_ref();

        let rows = state
            .records
            .iter()
            .map(|record| {
                let id = self.binding.record_id(record);
                let buffer = editing
                    .filter(|session| id.as_deref() == Some(session.id.as_str()))
                    .map(|session| &session.buffer);

                let cells = self
                    .binding
                    .columns()
                    .iter()
                    .map(|column| match buffer {
                        Some(buffer) => buffer.text(column.key()).unwrap_or_default(),
                        None => column.display(record),
                    })
                    .collect();

                TableRow {
                    id,
                    cells,
                    editing: buffer.is_some(),
                }
            })
            .collect();

        let create_form = (state.creating && affordances.create)
            .then(|| state.draft.render(self.binding.form(), &state.options));

        TableView {
            title: self.binding.title().to_owned(),
            subtitle: format!("Manage {} records", self.binding.title().to_lowercase()),
            headers: self
                .binding
                .columns()
                .iter()
                .map(|column| column.label().to_owned())
                .collect(),
            rows,
            affordances,
            error: state.error.clone(),
            notice: state.notice.clone(),
            create_form,
        }
    }

    fn affordances_for(&self, has_records: bool) -> TableAffordances {
        let create = self.session.has_permission(Capability::Create);
        let edit = self.binding.kind().supports_update()
            && self.session.has_permission(Capability::Update);
        let delete = self.binding.kind().supports_delete()
            && self.session.has_permission(Capability::Delete);
        let managed = self.binding.kind() == EntityBindingKind::Managed;

        TableAffordances {
            create,
            import: create,
            export: has_records,
            edit,
            delete,
            actions: managed && (create || edit || delete),
        }
    }
}
