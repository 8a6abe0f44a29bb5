use thiserror::Error;

/// Errors raised while building an [`ActionRegistry`](crate::ActionRegistry).
///
/// All of these are programming errors in the schema definitions and are
/// reported once, when the registry is constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Cyclic `extends` chain: {}", chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("Action type '{action_type}' extends unknown action type '{parent}'")]
    UnknownParent { action_type: String, parent: String },

    #[error("Action type '{0}' is registered more than once")]
    DuplicateActionType(String),

    #[error("Action type '{action_type}' declares field '{key}' more than once")]
    DuplicateFieldKey { action_type: String, key: String },

    #[error(
        "Field '{field}' of action type '{action_type}' references '{references}', which is not part of the resolved schema"
    )]
    DanglingReference {
        action_type: String,
        field: String,
        references: String,
    },

    #[error("Invalid condition: {0}")]
    InvalidCondition(String),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
