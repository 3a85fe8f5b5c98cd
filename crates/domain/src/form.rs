use std::collections::HashSet;

use cmms_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::field::{FieldDescriptor, RemoteOptions};

/// Validated, immutable set of form fields for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldDescriptor>", into = "Vec<FieldDescriptor>")]
pub struct FormSchema {
    fields: Vec<FieldDescriptor>,
}

impl FormSchema {
    /// Creates a form schema, checking cross-field invariants.
    ///
    /// Field names must be unique, every `depends_on` parent must be a sibling
    /// and parents must not depend on another field themselves.
    pub fn new(fields: Vec<FieldDescriptor>) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(AppError::Validation(format!(
                    "duplicate field name '{}' in form",
                    field.name()
                )));
            }
        }

        for field in &fields {
            let Some(depends_on) = field.depends_on() else {
                continue;
            };

            let parent = fields
                .iter()
                .find(|candidate| candidate.name() == depends_on.parent())
                .ok_or_else(|| {
                    AppError::Validation(format!(
                        "field '{}' depends on unknown field '{}'",
                        field.name(),
                        depends_on.parent()
                    ))
                })?;

            if parent.depends_on().is_some() {
                return Err(AppError::Validation(format!(
                    "field '{}' depends on '{}' which is itself dependent; only single-level cascades are supported",
                    field.name(),
                    parent.name()
                )));
            }
        }

        Ok(Self { fields })
    }

    /// Returns all fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Returns the fields whose choices are filtered by `parent`.
    pub fn dependents_of<'a>(
        &'a self,
        parent: &'a str,
    ) -> impl Iterator<Item = &'a FieldDescriptor> + 'a {
        self.fields.iter().filter(move |field| {
            field
                .depends_on()
                .is_some_and(|depends_on| depends_on.parent() == parent)
        })
    }

    /// Groups remote-backed fields by endpoint, in first-seen order.
    #[must_use]
    pub fn remote_groups(&self) -> Vec<(&str, Vec<(&FieldDescriptor, &RemoteOptions)>)> {
        let mut groups: Vec<(&str, Vec<(&FieldDescriptor, &RemoteOptions)>)> = Vec::new();

        for field in &self.fields {
            let Some(remote) = field.remote_options() else {
                continue;
            };

            match groups
                .iter_mut()
                .find(|(endpoint, _)| *endpoint == remote.endpoint())
            {
                Some((_, members)) => members.push((field, remote)),
                None => groups.push((remote.endpoint(), vec![(field, remote)])),
            }
        }

        groups
    }
}

impl TryFrom<Vec<FieldDescriptor>> for FormSchema {
    type Error = AppError;

    fn try_from(fields: Vec<FieldDescriptor>) -> Result<Self, Self::Error> {
        Self::new(fields)
    }
}

impl From<FormSchema> for Vec<FieldDescriptor> {
    fn from(schema: FormSchema) -> Self {
        schema.fields
    }
}
