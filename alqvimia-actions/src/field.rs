use crate::condition::Condition;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The editor widget a field is rendered with, which also fixes the shape of
/// the value it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FieldKind {
    Textarea,
    Number,
    Toggle,
    Checkbox,
    Select,
    MultiSelect,
    ButtonGroup,
    SelectWithIcons,
    Slider,
    Tags,
    KeyValue,
    File,
    FileWithVariable,
    FolderWithVariable,
    Variable,
    VariableSelect,
    TextWithVariable,
    TextareaWithVariable,
    WindowWithVariable,
    Code,
    Selector,
    Url,
    Email,
    Password,
    Date,
    Datetime,
    Expression,
    Richtext,
    /// Single line text. Unknown kinds coming from older documents fall back here.
    #[default]
    #[serde(other)]
    Text,
}

/// The JSON shape a field value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueShape {
    Bool,
    Number,
    Array,
    /// `[{key, value}]` pairs, or a plain object.
    KeyValue,
    /// Strings, or anything a variable reference may expand to.
    Scalar,
}

impl FieldKind {
    pub fn value_shape(&self) -> ValueShape {
        match self {
            FieldKind::Toggle | FieldKind::Checkbox => ValueShape::Bool,
            FieldKind::Number | FieldKind::Slider => ValueShape::Number,
            FieldKind::MultiSelect | FieldKind::Tags => ValueShape::Array,
            FieldKind::KeyValue => ValueShape::KeyValue,
            _ => ValueShape::Scalar,
        }
    }

    /// Whether the value must be picked from the field's option list.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            FieldKind::Select
                | FieldKind::MultiSelect
                | FieldKind::ButtonGroup
                | FieldKind::SelectWithIcons
        )
    }
}

/// One entry of a select-like field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOption {
    pub value: Value,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl FieldOption {
    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }
}

/// Shorthand for a string-valued option.
pub fn opt(value: &str, label: &str) -> FieldOption {
    FieldOption {
        value: Value::String(value.to_string()),
        label: label.to_string(),
        icon: None,
    }
}

/// Builds an option list from `(value, label)` pairs.
pub fn options(pairs: &[(&str, &str)]) -> Vec<FieldOption> {
    pairs.iter().map(|(v, l)| opt(v, l)).collect()
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One configurable parameter of an action type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Key of the sibling field that selects an entry of `options_map`/`default_map`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options_map: BTreeMap<String, Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_map: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub advanced: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_types: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub encrypted: bool,
}

impl FieldDescriptor {
    pub fn new(key: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            default: None,
            required: false,
            options: Vec::new(),
            depends_on: None,
            options_map: BTreeMap::new(),
            default_map: BTreeMap::new(),
            condition: None,
            advanced: false,
            placeholder: None,
            help_text: None,
            min: None,
            max: None,
            step: None,
            unit: None,
            rows: None,
            language: None,
            accept: None,
            file_type: None,
            allowed_types: Vec::new(),
            encrypted: false,
        }
    }

    pub fn text(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Text)
    }

    pub fn textarea(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Textarea)
    }

    pub fn number(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Number)
    }

    pub fn toggle(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Toggle)
    }

    pub fn select(key: &str, label: &str, choices: Vec<FieldOption>) -> Self {
        Self::new(key, label, FieldKind::Select).with_options(choices)
    }

    pub fn button_group(key: &str, label: &str, choices: Vec<FieldOption>) -> Self {
        Self::new(key, label, FieldKind::ButtonGroup).with_options(choices)
    }

    pub fn multi_select(key: &str, label: &str, choices: Vec<FieldOption>) -> Self {
        Self::new(key, label, FieldKind::MultiSelect).with_options(choices)
    }

    pub fn slider(key: &str, label: &str, min: f64, max: f64) -> Self {
        Self::new(key, label, FieldKind::Slider).range(min, max)
    }

    pub fn selector(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Selector)
    }

    /// Output variable picker. Most actions expose their result through one.
    pub fn variable(key: &str, label: &str) -> Self {
        Self::new(key, label, FieldKind::Variable)
    }

    pub fn code(key: &str, label: &str, language: &str) -> Self {
        let mut field = Self::new(key, label, FieldKind::Code);
        field.language = Some(language.to_string());
        field
    }

    pub fn file(key: &str, label: &str, accept: &str) -> Self {
        let mut field = Self::new(key, label, FieldKind::FileWithVariable);
        if !accept.is_empty() {
            field.accept = Some(accept.to_string());
        }
        field
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn advanced(mut self) -> Self {
        self.advanced = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_options(mut self, choices: Vec<FieldOption>) -> Self {
        self.options = choices;
        self
    }

    pub fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.to_string());
        self
    }

    pub fn help(mut self, text: &str) -> Self {
        self.help_text = Some(text.to_string());
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn allowed_types(mut self, types: &[&str]) -> Self {
        self.allowed_types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn encrypted(mut self) -> Self {
        self.encrypted = true;
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Makes the option list depend on the current value of `field`.
    pub fn options_by(mut self, field: &str, entries: Vec<(&str, Vec<FieldOption>)>) -> Self {
        self.depends_on = Some(field.to_string());
        self.options_map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        self
    }

    /// Makes the default depend on the current value of `field`.
    pub fn defaults_by(mut self, field: &str, entries: Vec<(&str, Value)>) -> Self {
        self.depends_on = Some(field.to_string());
        self.default_map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        self
    }

    /// Sibling keys this descriptor reads from.
    pub fn referenced_keys(&self) -> impl Iterator<Item = &str> {
        self.condition
            .as_ref()
            .map(|c| c.field.as_str())
            .into_iter()
            .chain(self.depends_on.as_deref())
    }
}
