use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use cmms_core::{AppResult, NonEmptyString};
use serde_json::Value;

use crate::record::{EntityRecord, scalar_text};

/// Custom cell renderer receiving the raw value and the whole record.
pub type CellRenderer = Arc<dyn Fn(&Value, &EntityRecord) -> String + Send + Sync>;

/// Presentation rule applied to a table cell.
#[derive(Clone, Default)]
pub enum ColumnRender {
    /// Raw value text; nulls render empty.
    #[default]
    Plain,
    /// Truthy values render `Yes`, everything else `No`.
    YesNo,
    /// Caller-supplied renderer.
    Custom(CellRenderer),
}

impl Debug for ColumnRender {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => formatter.write_str("Plain"),
            Self::YesNo => formatter.write_str("YesNo"),
            Self::Custom(_) => formatter.write_str("Custom(..)"),
        }
    }
}

/// Table column definition.
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    key: NonEmptyString,
    label: NonEmptyString,
    render: ColumnRender,
}

impl ColumnDescriptor {
    /// Creates a plain column.
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            key: NonEmptyString::new(key)?,
            label: NonEmptyString::new(label)?,
            render: ColumnRender::Plain,
        })
    }

    /// Replaces the presentation rule.
    #[must_use]
    pub fn with_render(mut self, render: ColumnRender) -> Self {
        self.render = render;
        self
    }

    /// Returns the record key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the header label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Renders this column's cell for `record`.
    #[must_use]
    pub fn display(&self, record: &EntityRecord) -> String {
        let value = record.get(self.key()).unwrap_or(&Value::Null);

        match &self.render {
            ColumnRender::Plain => scalar_text(value).unwrap_or_default(),
            ColumnRender::YesNo => {
                if is_truthy(value) {
                    "Yes".to_owned()
                } else {
                    "No".to_owned()
                }
            }
            ColumnRender::Custom(render) => render(value, record),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|number| number != 0.0),
        Value::String(text) => !text.is_empty() && text != "0",
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}
