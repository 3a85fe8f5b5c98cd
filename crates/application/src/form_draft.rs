//! Creation-form draft with cascading-select resolution.

use cmms_core::{AppError, AppResult};
use cmms_domain::{
    EntityRecord, FieldDescriptor, FieldKind, FormSchema, SelectOptions, scalar_text,
};
use serde_json::Value;

use crate::options_resolver::{ResolvedOptions, SelectOption};


/// Interaction state of one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// Dependent field whose parent has no value yet.
    Disabled,
    /// Editable field without a value.
    Empty,
    /// Field holding a value.
    Selected,
}

/// Control used to render a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldWidget {
    /// Plain input of the given HTML input type.
    Input {
        /// `text`, `number`, `date` or `datetime-local`.
        input_type: &'static str,
    },
    /// Free text backed by de-duplicated suggestions.
    Suggest {
        /// Suggested values.
        suggestions: Vec<String>,
    },
    /// Constrained choice among listed options.
    Choice {
        /// Placeholder shown while nothing is selected.
        placeholder: String,
        /// Selectable options.
        options: Vec<SelectOption>,
    },
}

/// Render snapshot of one form field.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField {
    /// Field name.
    pub name: String,
    /// Display label.
    pub label: String,
    /// Whether a value is needed before submission.
    pub required: bool,
    /// Current value as text.
    pub value: String,
    /// Interaction state.
    pub state: FieldState,
    /// Control to render.
    pub widget: FieldWidget,
}

/// Values typed or picked into a creation form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormDraft {
    values: EntityRecord,
}

impl FormDraft {
    /// Creates an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a draft holding `values`, such as a row being edited.
    #[must_use]
    pub fn from_values(values: EntityRecord) -> Self {
        Self { values }
    }

    /// Returns the collected values.
    #[must_use]
    pub fn values(&self) -> &EntityRecord {
        &self.values
    }

    /// Consumes the draft, returning the record to submit.
    #[must_use]
    pub fn into_record(self) -> EntityRecord {
        self.values
    }

    /// Returns the value of `name` as text; absent values yield an empty string.
    #[must_use]
    pub fn value_text(&self, name: &str) -> String {
        self.values.text(name).unwrap_or_default()
    }

    /// Returns whether nothing has been entered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drops every value.
    pub fn clear(&mut self) {
        self.values = EntityRecord::new();
    }

    /// Returns the interaction state of `field`.
    #[must_use]
    pub fn field_state(&self, field: &FieldDescriptor) -> FieldState {
        if let Some(depends_on) = field.depends_on()
            && !self.values.has_value(depends_on.parent())
        {
            return FieldState::Disabled;
        }

        if self.values.has_value(field.name()) {
            FieldState::Selected
        } else {
            FieldState::Empty
        }
    }

    /// Returns the options currently offered for `field`.
    ///
    /// Dependent cascades filter the raw reference records by the parent's
    /// current value; an unset parent or a parent matching nothing yields an
    /// empty list.
    #[must_use]
    pub fn options_for(
        &self,
        field: &FieldDescriptor,
        resolved: &ResolvedOptions,
    ) -> Vec<SelectOption> {
        match field.kind() {
            FieldKind::Select {
                options: SelectOptions::Static(options),
            } => options
                .iter()
                .map(|option| SelectOption {
                    value: option.value().clone(),
                    label: option.label().to_owned(),
                })
                .collect(),
            FieldKind::Select {
                options: SelectOptions::Remote(_),
            } => resolved.options(field.name()).to_vec(),
            FieldKind::CascadingSelect(cascading) => match cascading.parent() {
                None => resolved.options(field.name()).to_vec(),
                Some(_) => self
                    .candidate_records(field, resolved)
                    .into_iter()
                    .map(|record| SelectOption::from_record(record, cascading.source()))
                    .collect(),
            },
            FieldKind::Text | FieldKind::Number | FieldKind::Date | FieldKind::DateTime => {
                Vec::new()
            }
        }
    }

    /// Sets `name` to `text`, applying cascade rules.
    ///
    /// Constrained choices only accept a listed option, matched by value and
    /// then by label; the option's value is stored. A dependent
    /// field cannot be set while its parent is empty. Selecting a value with
    /// a resolve-to rule copies the matched record's attribute into the
    /// target field, and changing a parent clears its dependents together
    /// with the fields they resolved. Empty text clears the field.
    pub fn set_value(
        &mut self,
        schema: &FormSchema,
        resolved: &ResolvedOptions,
        name: &str,
        text: &str,
    ) -> AppResult<()> {
        let field = schema
            .field(name)
            .ok_or_else(|| AppError::Validation(format!("unknown form field '{name}'")))?;
        let text = text.trim();

        if !text.is_empty() && self.field_state(field) == FieldState::Disabled {
            let parent = field
                .depends_on()
                .map(|depends_on| depends_on.parent())
                .unwrap_or_default();
            return Err(AppError::Validation(format!(
                "'{}' is disabled until '{parent}' is set",
                field.label()
            )));
        }

        let previous = self.value_text(name);
        let value = if text.is_empty() {
            None
        } else if field.is_constrained_choice() {
            let options = self.options_for(field, resolved);
            let option = options
                .iter()
                .find(|option| option.value_text() == text)
                .or_else(|| options.iter().find(|option| option.label == text))
                .cloned()
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "'{text}' is not a valid choice for '{}'",
                        field.label()
                    ))
                })?;
            Some(option.value)
        } else {
            Some(Value::String(text.to_owned()))
        };

        let selected = value.as_ref().and_then(scalar_text).unwrap_or_default();
        let resolved_value = self.resolve_target(field, resolved, &selected);

        match value {
            Some(value) => self.values.insert(name, value)?,
            None => {
                self.values.remove(name);
            }
        }

        if let Some((target, resolved_value)) = resolved_value {
            match resolved_value {
                Some(value) => self.values.insert(target, value)?,
                None => {
                    self.values.remove(target.as_str());
                }
            }
        }

        if previous != selected {
            self.clear_dependents(schema, name);
        }

        Ok(())
    }

    /// Returns the labels of required fields that are still empty.
    #[must_use]
    pub fn missing_required(&self, schema: &FormSchema) -> Vec<String> {
        schema
            .fields()
            .iter()
            .filter(|field| field.is_required() && !self.values.has_value(field.name()))
            .map(|field| field.label().to_owned())
            .collect()
    }

    /// Renders every field of `schema` against this draft.
    #[must_use]
    pub fn render(&self, schema: &FormSchema, resolved: &ResolvedOptions) -> Vec<RenderedField> {
        schema
            .fields()
            .iter()
            .map(|field| RenderedField {
                name: field.name().to_owned(),
                label: field.label().to_owned(),
                required: field.is_required(),
                value: self.value_text(field.name()),
                state: self.field_state(field),
                widget: self.widget_for(field, resolved),
            })
            .collect()
    }

    fn widget_for(&self, field: &FieldDescriptor, resolved: &ResolvedOptions) -> FieldWidget {
        match field.kind() {
            FieldKind::Text => FieldWidget::Input { input_type: "text" },
            FieldKind::Number => FieldWidget::Input {
                input_type: "number",
            },
            FieldKind::Date => FieldWidget::Input { input_type: "date" },
            FieldKind::DateTime => FieldWidget::Input {
                input_type: "datetime-local",
            },
            FieldKind::CascadingSelect(cascading) if cascading.allows_new() => {
                let mut suggestions: Vec<String> = Vec::new();
                for option in self.options_for(field, resolved) {
                    let value = option.value_text();
                    if !value.is_empty() && !suggestions.contains(&value) {
                        suggestions.push(value);
                    }
                }
                FieldWidget::Suggest { suggestions }
            }
            FieldKind::Select { .. } | FieldKind::CascadingSelect(_) => FieldWidget::Choice {
                placeholder: format!("Select {}", field.label()),
                options: self.options_for(field, resolved),
            },
        }
    }

    /// Raw reference records a cascading field may pick from.
    fn candidate_records<'a>(
        &self,
        field: &FieldDescriptor,
        resolved: &'a ResolvedOptions,
    ) -> Vec<&'a EntityRecord> {
        let Some(source) = field.remote_options() else {
            return Vec::new();
        };
        let records = resolved.raw_records(source.endpoint());

        match field.depends_on() {
            None => records.iter().collect(),
            Some(depends_on) => {
                let parent_value = self.value_text(depends_on.parent());
                if parent_value.is_empty() {
                    return Vec::new();
                }

                records
                    .iter()
                    .filter(|record| {
                        record.text(depends_on.filter_by()).as_deref() == Some(parent_value.as_str())
                    })
                    .collect()
            }
        }
    }

    /// Value a resolve-to rule writes for `text`, paired with its target field.
    fn resolve_target(
        &self,
        field: &FieldDescriptor,
        resolved: &ResolvedOptions,
        text: &str,
    ) -> Option<(String, Option<Value>)> {
        let cascading = field.cascading()?;
        let resolve_to = cascading.resolution()?;
        let target = resolve_to.field().to_owned();

        if text.is_empty() {
            return Some((target, None));
        }

        let matched = self
            .candidate_records(field, resolved)
            .into_iter()
            .find(|record| record.text(cascading.source().value_key()).as_deref() == Some(text));

        let value = matched
            .and_then(|record| record.get(resolve_to.key()))
            .filter(|value| scalar_text(value).is_some())
            .cloned();

        Some((target, value))
    }

    fn clear_dependents(&mut self, schema: &FormSchema, parent: &str) {
        for dependent in schema.dependents_of(parent) {
            self.values.remove(dependent.name());
            if let Some(resolve_to) = dependent
                .cascading()
                .and_then(|cascading| cascading.resolution())
            {
                self.values.remove(resolve_to.field());
            }
        }
    }
}
