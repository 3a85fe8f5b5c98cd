use cmms_core::{AppError, AppResult, NonEmptyString};

use crate::column::ColumnDescriptor;
use crate::form::FormSchema;
use crate::record::EntityRecord;

/// How a collection is managed through the generic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityBindingKind {
    /// Full create, edit and delete.
    Managed,
    /// Link table: create and list only.
    Relationship,
}

impl EntityBindingKind {
    /// Returns whether rows can be edited in place.
    #[must_use]
    pub fn supports_update(self) -> bool {
        matches!(self, Self::Managed)
    }

    /// Returns whether rows can be deleted.
    #[must_use]
    pub fn supports_delete(self) -> bool {
        matches!(self, Self::Managed)
    }
}

/// Input payload for [`EntityBinding::new`].
#[derive(Debug, Clone)]
pub struct EntityBindingInput {
    /// REST collection name, e.g. `persons`.
    pub collection: String,
    /// Page title, e.g. `Person Management`.
    pub title: String,
    /// Singular display name used in server acknowledgements, e.g. `Person`.
    pub display_name: String,
    /// Record key identifying one row.
    pub id_field: String,
    /// Table columns in display order.
    pub columns: Vec<ColumnDescriptor>,
    /// Creation form.
    pub form: FormSchema,
    /// Management style.
    pub kind: EntityBindingKind,
}

/// Static table configuration binding a REST collection to the generic table.
#[derive(Debug, Clone)]
pub struct EntityBinding {
    collection: NonEmptyString,
    title: NonEmptyString,
    display_name: NonEmptyString,
    id_field: NonEmptyString,
    columns: Vec<ColumnDescriptor>,
    form: FormSchema,
    kind: EntityBindingKind,
}

impl EntityBinding {
    /// Creates a validated binding.
    ///
    /// Relationship forms must mark every field as required.
    pub fn new(input: EntityBindingInput) -> AppResult<Self> {
        if input.kind == EntityBindingKind::Relationship
            && let Some(optional) = input.form.fields().iter().find(|field| !field.is_required())
        {
            return Err(AppError::Validation(format!(
                "relationship field '{}' must be required",
                optional.name()
            )));
        }

        Ok(Self {
            collection: NonEmptyString::new(input.collection)?,
            title: NonEmptyString::new(input.title)?,
            display_name: NonEmptyString::new(input.display_name)?,
            id_field: NonEmptyString::new(input.id_field)?,
            columns: input.columns,
            form: input.form,
            kind: input.kind,
        })
    }

    /// Returns the REST collection name.
    #[must_use]
    pub fn collection(&self) -> &str {
        self.collection.as_str()
    }

    /// Returns the page title.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Returns the singular display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the id field name.
    #[must_use]
    pub fn id_field(&self) -> &str {
        self.id_field.as_str()
    }

    /// Returns table columns.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Returns the creation form.
    #[must_use]
    pub fn form(&self) -> &FormSchema {
        &self.form
    }

    /// Returns the management style.
    #[must_use]
    pub fn kind(&self) -> EntityBindingKind {
        self.kind
    }

    /// Returns the id of `record` as text, if present.
    #[must_use]
    pub fn record_id(&self, record: &EntityRecord) -> Option<String> {
        record
            .text(self.id_field())
            .filter(|value| !value.is_empty())
    }
}
