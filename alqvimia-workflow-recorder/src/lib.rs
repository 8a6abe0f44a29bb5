//! Recording sessions for the Alqvimia workflow designer
//!
//! A session walks the user through picking a target window, naming the
//! workflow and recording interactions. Each capture from the backend is
//! normalized into an action instance whose fields come from the
//! `alqvimia-actions` schema registry. A finished session is saved as plain
//! JSON or exported as a `.wfl` file.

pub mod action;
pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod handle;
pub mod normalize;
pub mod session;
pub mod sink;
pub mod wfl;
pub mod workflow;

pub use action::{ActionInstance, ExecutionPolicy};
pub use backend::{CaptureBackend, CaptureCommand, ChannelBackend};
pub use config::{RecorderConfig, RecorderConfigOptions};
pub use error::*;
pub use events::{
    CaptureEvent, CaptureSource, ElementDescriptor, Position, RawCapture, Rect, WindowDescriptor,
    WindowKind,
};
pub use handle::{SessionHandle, SessionSnapshot};
pub use normalize::{
    canonical_action_type, sanitize_variable_name, suggest_window_variable, Normalizer,
};
pub use session::{ActionEditor, EventOutcome, RecordingSession, SessionState, SessionUpdate};
pub use sink::{DirectorySink, MemorySink, WorkflowSink};
pub use wfl::{
    decode_bundle, decode_value, decode_workflow, encode_bundle, encode_value, encode_workflow,
    import_workflows, WFL_MAGIC,
};
pub use workflow::{
    action_to_step, export_file_name, step_to_action, Step, StepParams, VariableEntry,
    WorkflowDocument,
};
