//! Reference-data option resolution for remote-backed form fields.

use std::collections::HashMap;
use std::sync::Arc;

use cmms_domain::{EntityRecord, FormSchema, RemoteOptions, scalar_text};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::EntityCollectionApi;


/// One selectable choice.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    /// Stored value.
    pub value: Value,
    /// Display label.
    pub label: String,
}

impl SelectOption {
    /// Builds the option a remote record contributes to a field.
    #[must_use]
    pub fn from_record(record: &EntityRecord, source: &RemoteOptions) -> Self {
        Self {
            value: record
                .get(source.value_key())
                .cloned()
                .unwrap_or(Value::Null),
            label: source.label().render(record),
        }
    }

    /// Returns the value as form text; nulls yield an empty string.
    #[must_use]
    pub fn value_text(&self) -> String {
        scalar_text(&self.value).unwrap_or_default()
    }
}

/// Result of resolving every remote-backed field of one form.
#[derive(Debug, Clone, Default)]
pub struct ResolvedOptions {
    options: HashMap<String, Vec<SelectOption>>,
    raw: HashMap<String, Vec<EntityRecord>>,
    failed_endpoints: Vec<String>,
}

impl ResolvedOptions {
    /// Returns the precomputed options of an independent field.
    ///
    /// Dependent cascading fields have none; they filter
    /// [`Self::raw_records`] live instead.
    #[must_use]
    pub fn options(&self, field_name: &str) -> &[SelectOption] {
        self.options
            .get(field_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the raw records fetched from `endpoint`.
    #[must_use]
    pub fn raw_records(&self, endpoint: &str) -> &[EntityRecord] {
        self.raw
            .get(endpoint)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns endpoints whose fetch failed.
    #[must_use]
    pub fn failed_endpoints(&self) -> &[String] {
        &self.failed_endpoints
    }
}

/// Fetches reference collections and derives option lists.
#[derive(Clone)]
pub struct OptionsResolver {
    api: Arc<dyn EntityCollectionApi>,
}

impl OptionsResolver {
    /// Creates a resolver reading through `api`.
    #[must_use]
    pub fn new(api: Arc<dyn EntityCollectionApi>) -> Self {
        Self { api }
    }

    /// Resolves options for every remote-backed field of `schema`.
    ///
    /// Each distinct endpoint is fetched once. A failing endpoint is logged
    /// and leaves its fields without options; the others still resolve.
    pub async fn resolve(&self, schema: &FormSchema) -> ResolvedOptions {
        let mut resolved = ResolvedOptions::default();

        for (endpoint, members) in schema.remote_groups() {
            let records = match self.api.list(endpoint).await {
                Ok(records) => records,
                Err(error) => {
                    warn!(endpoint = %endpoint, error = %error, "failed to fetch options");
                    resolved.failed_endpoints.push(endpoint.to_owned());
                    continue;
                }
            };

            debug!(endpoint = %endpoint, records = records.len(), "fetched option source");

            for (field, source) in members {
                if field.depends_on().is_some() {
                    continue;
                }

                let unique = field
                    .cascading()
                    .is_some_and(|cascading| cascading.is_unique());
                let options = if unique {
                    unique_options(&records, source)
                } else {
                    records
                        .iter()
                        .map(|record| SelectOption::from_record(record, source))
                        .collect()
                };

                resolved.options.insert(field.name().to_owned(), options);
            }

            resolved.raw.insert(endpoint.to_owned(), records);
        }

        resolved
    }
}

/// Distinct values of the source key, labelled through a synthetic record
/// holding only that value. Records lacking the key are skipped.
pub(crate) fn unique_options(records: &[EntityRecord], source: &RemoteOptions) -> Vec<SelectOption> {
    let mut distinct: Vec<&Value> = Vec::new();
    for value in records
        .iter()
        .filter_map(|record| record.get(source.value_key()))
        .filter(|value| !value.is_null())
    {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }

    distinct
        .into_iter()
        .map(|value| {
            let mut synthetic = Map::new();
            synthetic.insert(source.value_key().to_owned(), value.clone());
            let synthetic = EntityRecord::try_from(synthetic).unwrap_or_default();

            SelectOption {
                value: value.clone(),
                label: source.label().render(&synthetic),
            }
        })
        .collect()
}
