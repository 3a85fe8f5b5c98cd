use cmms_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat record returned by a remote entity collection.
///
/// The shape is owned by the collection; the only local invariant is that
/// every value is a scalar (string, number, boolean or null).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct EntityRecord {
    fields: Map<String, Value>,
}

impl EntityRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Creates a record from a JSON value, rejecting non-object or nested payloads.
    pub fn from_value(value: Value) -> AppResult<Self> {
        match value {
            Value::Object(fields) => Self::try_from(fields),
            _ => Err(AppError::Validation(
                "entity record must be a JSON object".to_owned(),
            )),
        }
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the display text of the value stored under `key`.
    ///
    /// Absent keys and nulls yield `None`.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        self.fields.get(key).and_then(scalar_text)
    }

    /// Returns whether `key` holds a value whose display text is non-empty.
    #[must_use]
    pub fn has_value(&self, key: &str) -> bool {
        self.text(key).is_some_and(|text| !text.is_empty())
    }

    /// Stores a scalar value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> AppResult<()> {
        let key = key.into();
        ensure_scalar(key.as_str(), &value)?;
        self.fields.insert(key, value);
        Ok(())
    }

    /// Stores a text value under `key`.
    pub fn insert_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), Value::String(value.into()));
    }

    /// Removes `key` and returns its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Iterates over field names in storage order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Copies every field of `patch` over this record.
    pub fn merge(&mut self, patch: &EntityRecord) {
        for (key, value) in &patch.fields {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// Converts the record into a JSON object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl TryFrom<Map<String, Value>> for EntityRecord {
    type Error = AppError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        for (key, value) in &fields {
            ensure_scalar(key.as_str(), value)?;
        }

        Ok(Self { fields })
    }
}

impl From<EntityRecord> for Map<String, Value> {
    fn from(record: EntityRecord) -> Self {
        record.fields
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EntityRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(key, value)| (key.into(), Value::String(value.into())))
            .collect();
        Self { fields }
    }
}

/// Returns the display text for a scalar JSON value.
///
/// Strings are returned as-is, numbers and booleans in their JSON spelling,
/// nulls and composite values yield `None`.
#[must_use]
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn ensure_scalar(key: &str, value: &Value) -> AppResult<()> {
    if value.is_array() || value.is_object() {
        return Err(AppError::Validation(format!(
            "entity record field '{key}' must be a scalar value"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::{EntityRecord, scalar_text};

    #[test]
    fn record_requires_object_payload() {
        let result = EntityRecord::from_value(json!(["not", "an", "object"]));
        assert!(result.is_err());
    }

    #[test]
    fn record_rejects_nested_values() {
        let result = EntityRecord::from_value(json!({ "name": { "first": "Ada" } }));
        assert!(result.is_err());

        let deserialized = serde_json::from_value::<EntityRecord>(json!({ "tags": ["a"] }));
        assert!(deserialized.is_err());
    }

    #[test]
    fn text_renders_scalars_and_skips_null() {
        let record = EntityRecord::from_value(json!({
            "name": "Ada",
            "age": 36,
            "active": true,
            "supervisor_id": null
        }))
        .unwrap_or_else(|_| unreachable!());

        assert_eq!(record.text("name").as_deref(), Some("Ada"));
        assert_eq!(record.text("age").as_deref(), Some("36"));
        assert_eq!(record.text("active").as_deref(), Some("true"));
        assert_eq!(record.text("supervisor_id"), None);
        assert_eq!(record.text("missing"), None);
        assert!(!record.has_value("supervisor_id"));
    }

    #[test]
    fn merge_overwrites_existing_keys() {
        let mut record: EntityRecord = [("name", "Ada"), ("gender", "Female")]
            .into_iter()
            .collect();
        let patch: EntityRecord = [("name", "Ada Lovelace")].into_iter().collect();

        record.merge(&patch);

        assert_eq!(record.text("name").as_deref(), Some("Ada Lovelace"));
        assert_eq!(record.text("gender").as_deref(), Some("Female"));
    }

    #[test]
    fn scalar_text_ignores_composites() {
        assert_eq!(scalar_text(&Value::Null), None);
        assert_eq!(scalar_text(&json!({})), None);
        assert_eq!(scalar_text(&json!(1.5)).as_deref(), Some("1.5"));
    }
}
