use crate::session::SessionState;
use thiserror::Error;

/// Errors raised by a recording session and the workflow codecs.
///
/// These are expected run-time conditions: the session stays in its previous
/// state and the caller decides how to surface them.
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("Cannot {requested} while the session is {from}")]
    InvalidTransition {
        from: SessionState,
        requested: &'static str,
    },

    #[error("Capture backend is not connected")]
    BackendUnavailable,

    #[error("Malformed capture event: {0}")]
    MalformedCaptureEvent(String),

    #[error("A workflow name is required")]
    MissingWorkflowName,

    #[error("A window variable name is required")]
    MissingWindowVariable,

    #[error("No target window has been selected")]
    NoTargetWindow,

    #[error("No action with id '{0}'")]
    ActionNotFound(String),

    #[error("Action '{0}' binds the target window; discard the session to remove it")]
    ProtectedAction(String),

    #[error("'{0}' is not a valid variable name")]
    InvalidVariableName(String),

    #[error("Corrupt workflow file: {0}")]
    CorruptWorkflowFile(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Recording session is closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, RecorderError>;
