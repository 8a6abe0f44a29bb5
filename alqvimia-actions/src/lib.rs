//! Action schemas for the Alqvimia workflow designer
//!
//! Every automatable operation (clicking, typing, Excel, HTTP, AI calls, ...) is
//! described by an [`ActionSchema`]: an ordered list of [`FieldDescriptor`]s,
//! optionally extending another schema. The [`ActionRegistry`] validates the
//! whole set once, resolves `extends` chains on demand and caches the result.
//! The [`evaluator`] functions then decide which fields are visible, which
//! options they offer and which values are invalid for a given set of values.
//!
//! ```
//! use alqvimia_actions::{visible_fields, ActionRegistry};
//! use serde_json::json;
//!
//! let registry = ActionRegistry::builtin();
//! let schema = registry.resolve("screenshot");
//! let values = json!({"saveAs": true}).as_object().cloned().unwrap();
//! assert!(visible_fields(&schema, &values).iter().any(|f| f.key == "path"));
//! ```

pub mod catalog;
pub mod condition;
pub mod errors;
pub mod evaluator;
pub mod field;
pub mod registry;
pub mod schema;

pub use condition::{Condition, ConditionTest};
pub use errors::{Result, SchemaError};
pub use evaluator::{
    available_options, default_for, effective_values, is_visible, validate, visible_fields,
    visible_fields_with, FieldIssue, IssueKind,
};
pub use field::{opt, options, FieldDescriptor, FieldKind, FieldOption, ValueShape};
pub use registry::{ActionRegistry, Category, RegistryBuilder};
pub use schema::{ActionSchema, ResolvedSchema};
