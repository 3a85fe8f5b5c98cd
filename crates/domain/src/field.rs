use cmms_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::EntityRecord;

/// Display text derived from a remote reference record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OptionLabel {
    /// Shows the value stored under one record key.
    Key(String),
    /// Interpolates `{key}` placeholders with record values.
    Template(String),
}

impl OptionLabel {
    /// Renders the label for a remote record. Missing keys render as empty text.
    #[must_use]
    pub fn render(&self, record: &EntityRecord) -> String {
        match self {
            Self::Key(key) => record.text(key).unwrap_or_default(),
            Self::Template(template) => render_template(template, record),
        }
    }
}

fn render_template(template: &str, record: &EntityRecord) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];
        match after_open.find('}') {
            Some(close) => {
                let key = &after_open[..close];
                rendered.push_str(record.text(key).unwrap_or_default().as_str());
                rest = &after_open[close + 1..];
            }
            None => {
                rendered.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    rendered.push_str(rest);
    rendered
}

/// Choice drawn from a remote entity collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteOptions {
    endpoint: NonEmptyString,
    value_key: NonEmptyString,
    label: OptionLabel,
}

impl RemoteOptions {
    /// Creates a validated remote option source.
    pub fn new(
        endpoint: impl Into<String>,
        value_key: impl Into<String>,
        label: OptionLabel,
    ) -> AppResult<Self> {
        Ok(Self {
            endpoint: NonEmptyString::new(endpoint)?,
            value_key: NonEmptyString::new(value_key)?,
            label,
        })
    }

    /// Returns the remote collection name.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Returns the record key holding the option value.
    #[must_use]
    pub fn value_key(&self) -> &str {
        self.value_key.as_str()
    }

    /// Returns the label rule.
    #[must_use]
    pub fn label(&self) -> &OptionLabel {
        &self.label
    }
}

/// Fixed choice for a plain select field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticOption {
    label: NonEmptyString,
    value: Value,
}

impl StaticOption {
    /// Creates a choice with an explicit stored value.
    pub fn new(label: impl Into<String>, value: Value) -> AppResult<Self> {
        if value.is_null() || value.is_array() || value.is_object() {
            return Err(AppError::Validation(
                "static option values must be non-null scalars".to_owned(),
            ));
        }

        Ok(Self {
            label: NonEmptyString::new(label)?,
            value,
        })
    }

    /// Returns the label shown to the user.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the stored value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Choices for a plain select field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectOptions {
    /// Fixed list declared with the form.
    Static(Vec<StaticOption>),
    /// Choices loaded from another collection.
    Remote(RemoteOptions),
}

impl SelectOptions {
    /// Builds static choices whose stored value equals the label.
    pub fn labels<I, S>(labels: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options = labels
            .into_iter()
            .map(|label| {
                let label = label.into();
                StaticOption::new(label.clone(), Value::String(label))
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self::Static(options))
    }

    /// Builds the Yes/No choice stored as `1`/`0`.
    pub fn yes_no() -> AppResult<Self> {
        Ok(Self::Static(vec![
            StaticOption::new("Yes", Value::from(1))?,
            StaticOption::new("No", Value::from(0))?,
        ]))
    }
}

/// Parent link of a dependent cascading field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependsOn {
    parent: NonEmptyString,
    filter_by: NonEmptyString,
}

impl DependsOn {
    /// Creates a parent link filtering remote records by `filter_by`.
    pub fn new(parent: impl Into<String>, filter_by: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            parent: NonEmptyString::new(parent)?,
            filter_by: NonEmptyString::new(filter_by)?,
        })
    }

    /// Returns the parent field name.
    #[must_use]
    pub fn parent(&self) -> &str {
        self.parent.as_str()
    }

    /// Returns the remote record key compared to the parent's value.
    #[must_use]
    pub fn filter_by(&self) -> &str {
        self.filter_by.as_str()
    }
}

/// Sibling field populated from the matched remote record on selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveTo {
    field: NonEmptyString,
    key: NonEmptyString,
}

impl ResolveTo {
    /// Copies `matched[key]` into the form field `field`.
    pub fn new(field: impl Into<String>, key: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            field: NonEmptyString::new(field)?,
            key: NonEmptyString::new(key)?,
        })
    }

    /// Returns the target form field.
    #[must_use]
    pub fn field(&self) -> &str {
        self.field.as_str()
    }

    /// Returns the key read from the matched remote record.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }
}

/// Cascading select configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadingSelect {
    source: RemoteOptions,
    depends_on: Option<DependsOn>,
    unique: bool,
    allow_new: bool,
    resolve_to: Option<ResolveTo>,
}

impl CascadingSelect {
    /// Creates a cascading select drawing choices from `source`.
    #[must_use]
    pub fn new(source: RemoteOptions) -> Self {
        Self {
            source,
            depends_on: None,
            unique: false,
            allow_new: false,
            resolve_to: None,
        }
    }

    /// Filters choices by the current value of a parent field.
    #[must_use]
    pub fn depends_on(mut self, depends_on: DependsOn) -> Self {
        self.depends_on = Some(depends_on);
        self
    }

    /// Deduplicates option values before display.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Accepts free text alongside the suggested values.
    #[must_use]
    pub fn allow_new(mut self) -> Self {
        self.allow_new = true;
        self
    }

    /// Populates a sibling field from the matched record on selection.
    #[must_use]
    pub fn resolve_to(mut self, resolve_to: ResolveTo) -> Self {
        self.resolve_to = Some(resolve_to);
        self
    }

    /// Returns the remote option source.
    #[must_use]
    pub fn source(&self) -> &RemoteOptions {
        &self.source
    }

    /// Returns the parent link, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&DependsOn> {
        self.depends_on.as_ref()
    }

    /// Returns whether values are deduplicated.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Returns whether free text is accepted.
    #[must_use]
    pub fn allows_new(&self) -> bool {
        self.allow_new
    }

    /// Returns the resolve-to rule, if any.
    #[must_use]
    pub fn resolution(&self) -> Option<&ResolveTo> {
        self.resolve_to.as_ref()
    }
}

/// Supported form field kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text input.
    Text,
    /// Numeric input.
    Number,
    /// Date-only input.
    Date,
    /// Date-time input.
    DateTime,
    /// Plain select.
    Select {
        /// Static or remote choices.
        options: SelectOptions,
    },
    /// Select whose choices may depend on a sibling field.
    CascadingSelect(CascadingSelect),
}

impl FieldKind {
    /// Returns the stable type name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Select { .. } => "select",
            Self::CascadingSelect(_) => "cascading-select",
        }
    }
}

/// Form field descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    name: NonEmptyString,
    label: NonEmptyString,
    kind: FieldKind,
    required: bool,
}

impl FieldDescriptor {
    /// Creates a validated field descriptor.
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> AppResult<Self> {
        let name = NonEmptyString::new(name)?;

        if let FieldKind::CascadingSelect(cascading) = &kind {
            if cascading
                .parent()
                .is_some_and(|depends_on| depends_on.parent() == name.as_str())
            {
                return Err(AppError::Validation(format!(
                    "field '{name}' cannot depend on itself"
                )));
            }

            if cascading
                .resolution()
                .is_some_and(|resolve_to| resolve_to.field() == name.as_str())
            {
                return Err(AppError::Validation(format!(
                    "field '{name}' cannot resolve into itself"
                )));
            }
        }

        Ok(Self {
            name,
            label: NonEmptyString::new(label)?,
            kind,
            required: false,
        })
    }

    /// Shorthand for a text field.
    pub fn text(name: impl Into<String>, label: impl Into<String>) -> AppResult<Self> {
        Self::new(name, label, FieldKind::Text)
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the field kind.
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Returns whether the field must be filled before submission.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the remote source for fields backed by another collection.
    #[must_use]
    pub fn remote_options(&self) -> Option<&RemoteOptions> {
        match &self.kind {
            FieldKind::Select {
                options: SelectOptions::Remote(remote),
            } => Some(remote),
            FieldKind::CascadingSelect(cascading) => Some(cascading.source()),
            _ => None,
        }
    }

    /// Returns the cascading configuration, if any.
    #[must_use]
    pub fn cascading(&self) -> Option<&CascadingSelect> {
        match &self.kind {
            FieldKind::CascadingSelect(cascading) => Some(cascading),
            _ => None,
        }
    }

    /// Returns the parent link for dependent cascading fields.
    #[must_use]
    pub fn depends_on(&self) -> Option<&DependsOn> {
        self.cascading().and_then(CascadingSelect::parent)
    }

    /// Returns whether the field only accepts listed option values.
    #[must_use]
    pub fn is_constrained_choice(&self) -> bool {
        match &self.kind {
            FieldKind::Select { .. } => true,
            FieldKind::CascadingSelect(cascading) => !cascading.allows_new(),
            _ => false,
        }
    }
}
