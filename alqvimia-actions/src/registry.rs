use crate::errors::{Result, SchemaError};
use crate::field::FieldDescriptor;
use crate::schema::{merge_fields, ActionSchema, ResolvedSchema};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// A palette group of action types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub action_types: Vec<String>,
}

impl Category {
    pub fn new(id: &str, name: &str, icon: &str, action_types: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            action_types: action_types.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Collects schemas and validates them as a whole in [`RegistryBuilder::build`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    schemas: Vec<ActionSchema>,
    categories: Vec<Category>,
    common_fields: Vec<FieldDescriptor>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema(mut self, schema: ActionSchema) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn schemas(mut self, schemas: impl IntoIterator<Item = ActionSchema>) -> Self {
        self.schemas.extend(schemas);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    pub fn common_fields(mut self, fields: Vec<FieldDescriptor>) -> Self {
        self.common_fields = fields;
        self
    }

    /// Validates every schema and freezes the registry.
    ///
    /// Checks, in order: duplicate action types, duplicate local field keys,
    /// unknown parents and `extends` cycles, then keys referenced by
    /// `condition`/`dependsOn` against each flattened schema.
    pub fn build(self) -> Result<ActionRegistry> {
        let mut order = Vec::with_capacity(self.schemas.len());
        let mut schemas = HashMap::with_capacity(self.schemas.len());

        for schema in self.schemas {
            let mut seen = HashSet::new();
            for field in &schema.fields {
                if !seen.insert(field.key.as_str()) {
                    return Err(SchemaError::DuplicateFieldKey {
                        action_type: schema.action_type_id.clone(),
                        key: field.key.clone(),
                    });
                }
            }
            if schemas.contains_key(&schema.action_type_id) {
                return Err(SchemaError::DuplicateActionType(schema.action_type_id));
            }
            order.push(schema.action_type_id.clone());
            schemas.insert(schema.action_type_id.clone(), schema);
        }

        for id in &order {
            let chain = extends_chain(&schemas, id)?;
            let flattened = flatten(&schemas, &chain);
            let keys: HashSet<&str> = flattened.iter().map(|f| f.key.as_str()).collect();
            for field in &flattened {
                if let Some(missing) = field.referenced_keys().find(|k| !keys.contains(k)) {
                    return Err(SchemaError::DanglingReference {
                        action_type: id.clone(),
                        field: field.key.clone(),
                        references: missing.to_string(),
                    });
                }
            }
        }

        for category in &self.categories {
            for member in &category.action_types {
                if !schemas.contains_key(member) {
                    warn!(
                        "Category '{}' lists unregistered action type '{}'",
                        category.id, member
                    );
                }
            }
        }

        debug!("Action registry built with {} schemas", order.len());

        Ok(ActionRegistry {
            schemas,
            order,
            categories: self.categories,
            common_fields: self.common_fields,
            cache: RwLock::new(HashMap::new()),
        })
    }
}

/// Immutable map from action type to schema, with a read-through cache of
/// resolved schemas.
#[derive(Debug)]
pub struct ActionRegistry {
    schemas: HashMap<String, ActionSchema>,
    order: Vec<String>,
    categories: Vec<Category>,
    common_fields: Vec<FieldDescriptor>,
    cache: RwLock<HashMap<String, Arc<ResolvedSchema>>>,
}

static BUILTIN: Lazy<ActionRegistry> = Lazy::new(|| {
    crate::catalog::builder()
        .build()
        .unwrap_or_else(|e| panic!("built-in action catalog is invalid: {e}"))
});

impl ActionRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The registry shipped with the designer, built on first use.
    pub fn builtin() -> &'static ActionRegistry {
        &BUILTIN
    }

    /// Resolves `action_type` into its flattened schema.
    ///
    /// Unregistered types get [`ResolvedSchema::fallback`]. The fallback is not
    /// cached, so the cache only ever holds registered types.
    pub fn resolve(&self, action_type: &str) -> Arc<ResolvedSchema> {
        if let Some(hit) = self
            .cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(action_type)
        {
            return Arc::clone(hit);
        }

        let Some(leaf) = self.schemas.get(action_type) else {
            debug!("Unknown action type '{}', using blank schema", action_type);
            return Arc::new(ResolvedSchema::fallback(action_type));
        };

        // build() already rejected cycles and unknown parents
        let chain = match extends_chain(&self.schemas, action_type) {
            Ok(chain) => chain,
            Err(e) => {
                warn!("Resolving '{}' failed: {}", action_type, e);
                return Arc::new(ResolvedSchema::fallback(action_type));
            }
        };

        let resolved = Arc::new(ResolvedSchema {
            action_type_id: leaf.action_type_id.clone(),
            title: leaf.title.clone(),
            icon: inherited(&self.schemas, &chain, |s| &s.icon),
            description: inherited(&self.schemas, &chain, |s| &s.description),
            fields: flatten(&self.schemas, &chain),
            is_container: chain
                .iter()
                .filter_map(|id| self.schemas.get(id))
                .any(|s| s.is_container),
            lineage: chain[1..].to_vec(),
            is_fallback: false,
        });
        debug!(
            "Resolved '{}' with {} fields",
            action_type,
            resolved.fields.len()
        );

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            cache
                .entry(action_type.to_string())
                .or_insert(resolved),
        )
    }

    pub fn contains(&self, action_type: &str) -> bool {
        self.schemas.contains_key(action_type)
    }

    /// The raw, unflattened schema as registered.
    pub fn schema(&self, action_type: &str) -> Option<&ActionSchema> {
        self.schemas.get(action_type)
    }

    /// Registered action types in registration order.
    pub fn action_types(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// The first category listing `action_type`.
    pub fn category_of(&self, action_type: &str) -> Option<&Category> {
        self.categories
            .iter()
            .find(|c| c.action_types.iter().any(|t| t == action_type))
    }

    /// Execution-policy fields shown under every action panel.
    pub fn common_fields(&self) -> &[FieldDescriptor] {
        &self.common_fields
    }
}

/// Walks `extends` from `id` to the root. Returns `[id, parent, ..., root]`.
fn extends_chain(schemas: &HashMap<String, ActionSchema>, id: &str) -> Result<Vec<String>> {
    let mut chain: Vec<String> = Vec::new();
    let mut current = id.to_string();

    loop {
        if let Some(pos) = chain.iter().position(|c| *c == current) {
            let mut cycle = chain[pos..].to_vec();
            cycle.push(current);
            return Err(SchemaError::Cycle { chain: cycle });
        }

        let parent = schemas.get(&current).and_then(|s| s.extends.clone());
        chain.push(current);

        match parent {
            None => return Ok(chain),
            Some(parent) if !schemas.contains_key(&parent) => {
                return Err(SchemaError::UnknownParent {
                    action_type: chain[chain.len() - 1].clone(),
                    parent,
                });
            }
            Some(parent) => current = parent,
        }
    }
}

fn flatten(schemas: &HashMap<String, ActionSchema>, chain: &[String]) -> Vec<FieldDescriptor> {
    chain
        .iter()
        .rev()
        .filter_map(|id| schemas.get(id))
        .fold(Vec::new(), |acc, schema| merge_fields(&acc, &schema.fields))
}

/// Nearest non-empty value along the chain, leaf first.
fn inherited(
    schemas: &HashMap<String, ActionSchema>,
    chain: &[String],
    pick: impl Fn(&ActionSchema) -> &String,
) -> String {
    chain
        .iter()
        .filter_map(|id| schemas.get(id))
        .map(pick)
        .find(|v| !v.is_empty())
        .cloned()
        .unwrap_or_default()
}
