use crate::field::FieldDescriptor;
use serde::{Deserialize, Serialize};

/// Raw description of one action type, as registered.
///
/// `fields` only holds the fields declared locally. Inherited fields are
/// merged in by the registry when the schema is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSchema {
    pub action_type_id: String,
    pub title: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default)]
    pub is_container: bool,
}

impl ActionSchema {
    pub fn new(action_type_id: &str, title: &str, icon: &str) -> Self {
        Self {
            action_type_id: action_type_id.to_string(),
            title: title.to_string(),
            icon: icon.to_string(),
            description: String::new(),
            fields: Vec::new(),
            extends: None,
            is_container: false,
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn extends(mut self, parent: &str) -> Self {
        self.extends = Some(parent.to_string());
        self
    }

    pub fn container(mut self) -> Self {
        self.is_container = true;
        self
    }
}

/// A schema with its `extends` chain flattened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSchema {
    pub action_type_id: String,
    pub title: String,
    pub icon: String,
    pub description: String,
    pub fields: Vec<FieldDescriptor>,
    pub is_container: bool,
    /// Ancestors from the direct parent up to the root of the chain.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lineage: Vec<String>,
    /// Set when the action type was not registered and this is the blank fallback.
    #[serde(default)]
    pub is_fallback: bool,
}

impl ResolvedSchema {
    /// The blank panel handed out for unregistered action types.
    pub fn fallback(action_type_id: &str) -> Self {
        Self {
            action_type_id: action_type_id.to_string(),
            title: action_type_id.to_string(),
            icon: String::new(),
            description: String::new(),
            fields: Vec::new(),
            is_container: false,
            lineage: Vec::new(),
            is_fallback: true,
        }
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn basic_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.advanced)
    }

    pub fn advanced_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.advanced)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }
}

/// Merges a child's local fields over an already flattened parent field list.
///
/// A child field with the same key replaces the parent descriptor where it
/// stood; new keys are appended in declaration order.
pub(crate) fn merge_fields(
    parent: &[FieldDescriptor],
    child: &[FieldDescriptor],
) -> Vec<FieldDescriptor> {
    let mut merged = parent.to_vec();
    for field in child {
        match merged.iter_mut().find(|f| f.key == field.key) {
            Some(slot) => *slot = field.clone(),
            None => merged.push(field.clone()),
        }
    }
    merged
}
