//! The recording session state machine.
//!
//! ```text
//! Idle -> SelectingWindow -> ConfiguringWorkflow -> Recording <-> Paused
//!                                                      \          /
//!                                                       -> Stopped
//! ```
//!
//! Any state can be discarded back to `Idle`. `actions[0]` is the window
//! binding from the moment recording starts; only discarding removes it.

use crate::action::{ActionInstance, ExecutionPolicy};
use crate::backend::{CaptureBackend, CaptureCommand};
use crate::config::RecorderConfig;
use crate::error::{RecorderError, Result};
use crate::events::{CaptureEvent, RawCapture, WindowDescriptor};
use crate::normalize::{sanitize_variable_name, suggest_window_variable, Normalizer};
use crate::wfl;
use crate::workflow::{new_workflow_id, WorkflowDocument};
use alqvimia_actions::{
    effective_values, validate, visible_fields, ActionRegistry, FieldDescriptor, FieldIssue,
    ResolvedSchema,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Idle,
    SelectingWindow,
    ConfiguringWorkflow,
    Recording,
    Paused,
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::SelectingWindow => "selecting a window",
            SessionState::ConfiguringWorkflow => "configuring the workflow",
            SessionState::Recording => "recording",
            SessionState::Paused => "paused",
            SessionState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

impl SessionState {
    /// States in which the action list exists and can be edited
    pub fn has_actions(&self) -> bool {
        matches!(
            self,
            SessionState::Recording | SessionState::Paused | SessionState::Stopped
        )
    }
}

/// Broadcast to subscribers after every committed change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "update", rename_all = "kebab-case")]
pub enum SessionUpdate {
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
    ActionAdded {
        index: usize,
        action: Box<ActionInstance>,
    },
    ActionUpdated {
        action: Box<ActionInstance>,
    },
    ActionRemoved {
        id: String,
    },
    EventDropped {
        event: String,
        reason: String,
    },
    Error {
        message: String,
    },
}

/// What a capture event did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    /// A new action with this id was appended
    Appended(String),
    /// Arrived while paused; discarded
    Dropped,
    /// Not meaningful in the current state
    Ignored,
    Transitioned(SessionState),
}

/// Everything an editor panel needs for one action
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEditor {
    pub action: ActionInstance,
    pub schema: ResolvedSchema,
    /// Values as the panel shows them, policy flags included
    pub values: Map<String, Value>,
    pub visible_fields: Vec<FieldDescriptor>,
    pub common_fields: Vec<FieldDescriptor>,
    pub common_values: Map<String, Value>,
    pub issues: Vec<FieldIssue>,
}

pub struct RecordingSession {
    state: SessionState,
    backend: Arc<dyn CaptureBackend>,
    registry: &'static ActionRegistry,
    normalizer: Normalizer,
    workflow_id: String,
    target_window: Option<WindowDescriptor>,
    suggested_variable: Option<String>,
    workflow_name: String,
    description: String,
    window_variable_name: String,
    actions: Vec<ActionInstance>,
    /// Whether the backend was last told to begin capture
    capture_open: bool,
    last_error: Option<String>,
    created_at: DateTime<Utc>,
    updates: broadcast::Sender<SessionUpdate>,
}

impl fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSession")
            .field("state", &self.state)
            .field("workflow_name", &self.workflow_name)
            .field("window_variable_name", &self.window_variable_name)
            .field("actions", &self.actions.len())
            .field("capture_open", &self.capture_open)
            .finish()
    }
}

impl RecordingSession {
    pub fn new(config: RecorderConfig, backend: Arc<dyn CaptureBackend>) -> Self {
        let (updates, _) = broadcast::channel(config.event_buffer.max(1));
        let now = Utc::now();
        Self {
            state: SessionState::Idle,
            backend,
            registry: ActionRegistry::builtin(),
            normalizer: Normalizer::new(config),
            workflow_id: new_workflow_id(now),
            target_window: None,
            suggested_variable: None,
            workflow_name: String::new(),
            description: String::new(),
            window_variable_name: String::new(),
            actions: Vec::new(),
            capture_open: false,
            last_error: None,
            created_at: now,
            updates,
        }
    }

    /// Uses `registry` instead of the built-in catalog for manual steps and
    /// editing.
    pub fn with_registry(mut self, registry: &'static ActionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Reopens a saved workflow, paused, for review and editing.
    ///
    /// Documents that only carry studio steps are converted back to actions.
    /// When the first action is not a window binding one is synthesized from
    /// the document's target window.
    pub fn restore(
        document: &WorkflowDocument,
        config: RecorderConfig,
        backend: Arc<dyn CaptureBackend>,
    ) -> Result<Self> {
        if document.name.trim().is_empty() {
            return Err(RecorderError::MissingWorkflowName);
        }
        let mut session = Self::new(config, backend);
        let mut actions = document.recorded_actions();

        let target = document
            .target_window
            .clone()
            .or_else(|| actions.first().and_then(|a| a.window.clone()));

        let bound = actions.first().is_some_and(|a| a.is_window_action);
        if !bound {
            let window = target.clone().ok_or(RecorderError::NoTargetWindow)?;
            let variable = if document.window_variable.is_empty() {
                suggest_window_variable(&window)
            } else {
                document.window_variable.clone()
            };
            let binding = session
                .normalizer
                .window_action(&window, &variable, document.created_at);
            actions.insert(0, binding);
        }

        session.window_variable_name = if document.window_variable.is_empty() {
            actions[0].variable_name.clone()
        } else {
            document.window_variable.clone()
        };
        if !document.id.is_empty() {
            session.workflow_id = document.id.clone();
        }
        session.workflow_name = document.name.clone();
        session.description = document.description.clone();
        session.target_window = target;
        session.created_at = document.created_at;
        session.actions = actions;
        session.state = SessionState::Paused;

        info!(
            "Restored workflow '{}' with {} actions (paused)",
            session.workflow_name,
            session.actions.len()
        );
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn actions(&self) -> &[ActionInstance] {
        &self.actions
    }

    pub fn action(&self, id: &str) -> Option<&ActionInstance> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn target_window(&self) -> Option<&WindowDescriptor> {
        self.target_window.as_ref()
    }

    pub fn suggested_window_variable(&self) -> Option<&str> {
        self.suggested_variable.as_deref()
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn window_variable_name(&self) -> &str {
        &self.window_variable_name
    }

    pub fn config(&self) -> &RecorderConfig {
        self.normalizer.config()
    }

    /// Whether the backend is currently expected to be emitting captures
    pub fn is_capture_open(&self) -> bool {
        self.capture_open
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Keeps `error` as the session-level status and tells subscribers.
    pub fn record_error(&mut self, error: &RecorderError) {
        let message = error.to_string();
        self.emit(SessionUpdate::Error {
            message: message.clone(),
        });
        self.last_error = Some(message);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    pub(crate) fn update_sender(&self) -> broadcast::Sender<SessionUpdate> {
        self.updates.clone()
    }

    /// Get a stream of session updates
    pub fn update_stream(&self) -> impl Stream<Item = SessionUpdate> {
        updates_as_stream(self.updates.subscribe())
    }

    // ---- transitions -------------------------------------------------

    /// `Idle -> SelectingWindow`. Refused while the capture backend is
    /// unreachable.
    pub fn start(&mut self) -> Result<()> {
        self.expect(&[SessionState::Idle], "start recording")?;
        if !self.backend.is_connected() {
            warn!("Cannot start recording: capture backend is not connected");
            return Err(RecorderError::BackendUnavailable);
        }
        self.transition(SessionState::SelectingWindow);
        Ok(())
    }

    /// `SelectingWindow -> ConfiguringWorkflow`. The descriptor is copied;
    /// later changes to the live window list do not affect it. Returns the
    /// suggested window variable.
    pub fn select_window(&mut self, window: WindowDescriptor) -> Result<String> {
        self.expect(&[SessionState::SelectingWindow], "select a window")?;
        CaptureEvent::WindowSelected(window.clone()).validate()?;

        let suggestion = suggest_window_variable(&window);
        info!(
            "Selected target window '{}' (suggested variable {})",
            window.display_name(),
            suggestion
        );
        self.target_window = Some(window);
        self.suggested_variable = Some(suggestion.clone());
        self.transition(SessionState::ConfiguringWorkflow);
        Ok(suggestion)
    }

    /// Chooses an existing workflow variable as the target window.
    pub fn select_variable_as_window(&mut self, variable: &str) -> Result<String> {
        let name = sanitize_variable_name(variable)?;
        self.select_window(WindowDescriptor::from_variable(name))
    }

    /// `ConfiguringWorkflow -> Recording`. Synthesizes the window binding as
    /// `actions[0]` and tells the backend to begin capture. Nothing changes
    /// if the backend refuses.
    pub fn configure(
        &mut self,
        workflow_name: &str,
        window_variable: &str,
        description: &str,
    ) -> Result<()> {
        self.expect(&[SessionState::ConfiguringWorkflow], "begin recording")?;
        let name = workflow_name.trim();
        if name.is_empty() {
            return Err(RecorderError::MissingWorkflowName);
        }
        if window_variable.trim().is_empty() {
            return Err(RecorderError::MissingWindowVariable);
        }
        let variable = sanitize_variable_name(window_variable)?;
        let target = self
            .target_window
            .clone()
            .ok_or(RecorderError::NoTargetWindow)?;

        self.backend.send(CaptureCommand::BeginCapture {
            target: target.clone(),
            workflow_name: name.to_string(),
        })?;
        self.capture_open = true;

        let binding = self.normalizer.window_action(&target, &variable, Utc::now());
        self.workflow_name = name.to_string();
        self.description = description.trim().to_string();
        self.window_variable_name = variable;
        self.actions = vec![binding];

        self.transition(SessionState::Recording);
        self.emit(SessionUpdate::ActionAdded {
            index: 0,
            action: Box::new(self.actions[0].clone()),
        });
        info!("▶️ Recording '{}'", self.workflow_name);
        Ok(())
    }

    /// `Recording -> Paused`. Captures arriving while paused are dropped.
    /// Pausing a paused session does nothing.
    pub fn pause(&mut self) -> Result<()> {
        if self.state == SessionState::Paused {
            return Ok(());
        }
        self.expect(&[SessionState::Recording], "pause")?;
        if let Err(e) = self.backend.send(CaptureCommand::Pause) {
            warn!("Capture backend did not take the pause notice: {}", e);
        }
        self.transition(SessionState::Paused);
        Ok(())
    }

    /// `Paused -> Recording`. A restored session has never opened capture,
    /// so it sends `BeginCapture` instead of `Resume`.
    pub fn resume(&mut self) -> Result<()> {
        if self.state == SessionState::Recording {
            return Ok(());
        }
        self.expect(&[SessionState::Paused], "resume")?;
        if self.capture_open {
            if let Err(e) = self.backend.send(CaptureCommand::Resume) {
                warn!("Capture backend did not take the resume notice: {}", e);
            }
        } else {
            let target = self
                .target_window
                .clone()
                .or_else(|| self.actions.first().and_then(|a| a.window.clone()))
                .ok_or(RecorderError::NoTargetWindow)?;
            self.backend.send(CaptureCommand::BeginCapture {
                target,
                workflow_name: self.workflow_name.clone(),
            })?;
            self.capture_open = true;
        }
        self.transition(SessionState::Recording);
        Ok(())
    }

    /// `Recording | Paused -> Stopped`. Stopping a stopped session is a
    /// no-op. The local stop always commits, even if the backend is gone.
    pub fn stop(&mut self) -> Result<()> {
        if self.state == SessionState::Stopped {
            debug!("Stop requested on a stopped session");
            return Ok(());
        }
        self.expect(&[SessionState::Recording, SessionState::Paused], "stop")?;
        self.close_capture();
        self.transition(SessionState::Stopped);
        info!(
            "⏹️ Stopped '{}' with {} actions",
            self.workflow_name,
            self.actions.len()
        );
        Ok(())
    }

    /// Drops everything, including the window binding, and returns to `Idle`.
    pub fn discard(&mut self) {
        self.close_capture();
        self.target_window = None;
        self.suggested_variable = None;
        self.workflow_name.clear();
        self.description.clear();
        self.window_variable_name.clear();
        self.actions.clear();
        self.last_error = None;
        let now = Utc::now();
        self.workflow_id = new_workflow_id(now);
        self.created_at = now;
        if self.state != SessionState::Idle {
            self.transition(SessionState::Idle);
        }
    }

    // ---- capture events ----------------------------------------------

    /// Applies one parsed capture event.
    pub fn handle_event(&mut self, event: CaptureEvent) -> Result<EventOutcome> {
        event.validate()?;
        match event {
            CaptureEvent::SessionStopped { reason } => match self.state {
                SessionState::Recording | SessionState::Paused => {
                    info!(
                        "Capture backend ended the session: {}",
                        reason.as_deref().unwrap_or("no reason given")
                    );
                    // the backend has already stopped; no EndCapture
                    self.capture_open = false;
                    self.transition(SessionState::Stopped);
                    Ok(EventOutcome::Transitioned(SessionState::Stopped))
                }
                _ => Ok(EventOutcome::Ignored),
            },
            CaptureEvent::WindowSelected(window) => match self.state {
                SessionState::SelectingWindow => {
                    self.select_window(window)?;
                    Ok(EventOutcome::Transitioned(self.state))
                }
                SessionState::Recording => {
                    let action = self.normalizer.window_switch(&window, Utc::now());
                    Ok(EventOutcome::Appended(self.append(action)))
                }
                SessionState::Paused => Ok(self.drop_event("window-selected")),
                _ => Ok(EventOutcome::Ignored),
            },
            CaptureEvent::ElementCaptured(raw) => self.capture(&raw),
        }
    }

    /// Parses and applies an event as received from the transport. Malformed
    /// events are rejected whole and logged.
    pub fn handle_raw(&mut self, value: Value) -> Result<EventOutcome> {
        match CaptureEvent::from_value(value) {
            Ok(event) => self.handle_event(event),
            Err(e) => {
                warn!("Dropping capture event: {}", e);
                Err(e)
            }
        }
    }

    fn capture(&mut self, raw: &RawCapture) -> Result<EventOutcome> {
        match self.state {
            SessionState::Recording => {
                let action = self.normalizer.normalize(raw);
                Ok(EventOutcome::Appended(self.append(action)))
            }
            SessionState::Paused => Ok(self.drop_event("element-captured")),
            state => {
                debug!("Ignoring element capture while {}", state);
                Ok(EventOutcome::Ignored)
            }
        }
    }

    fn drop_event(&mut self, event: &str) -> EventOutcome {
        debug!("Dropping {} while paused", event);
        self.emit(SessionUpdate::EventDropped {
            event: event.to_string(),
            reason: "paused".to_string(),
        });
        EventOutcome::Dropped
    }

    // ---- editing -----------------------------------------------------

    /// Appends a step the user added by hand, with the schema's defaults
    /// filled in. Allowed while recording, paused or stopped.
    pub fn add_manual_action(
        &mut self,
        action_type: &str,
        values: Map<String, Value>,
    ) -> Result<String> {
        self.expect(
            &[
                SessionState::Recording,
                SessionState::Paused,
                SessionState::Stopped,
            ],
            "add a step",
        )?;
        let schema = self.registry.resolve(action_type);
        if schema.is_fallback {
            debug!("Adding step of unregistered type '{}'", action_type);
        }
        let filled = effective_values(&schema, &values);
        let variable = self.normalizer.variable_for(action_type, Utc::now());

        let mut action = ActionInstance::new(action_type, variable, self.normalizer.config());
        action.apply_patch(filled, &schema);
        Ok(self.append(action))
    }

    /// Renames an action's output variable. Renaming the window binding also
    /// renames the workflow's window variable.
    pub fn rename_variable(&mut self, id: &str, name: &str) -> Result<String> {
        let name = sanitize_variable_name(name)?;
        let index = self.index_of(id)?;
        self.actions[index].variable_name = name.clone();
        if index == 0 && self.actions[0].is_window_action {
            self.window_variable_name = name.clone();
        }
        self.updated(index);
        Ok(name)
    }

    /// Merges `patch` into an action's values (`null` removes a key).
    pub fn update_values(&mut self, id: &str, patch: Map<String, Value>) -> Result<()> {
        let index = self.index_of(id)?;
        let schema = self.registry.resolve(&self.actions[index].action_type);
        self.actions[index].apply_patch(patch, &schema);
        self.updated(index);
        Ok(())
    }

    pub fn set_policy(&mut self, id: &str, policy: ExecutionPolicy) -> Result<()> {
        let index = self.index_of(id)?;
        self.actions[index].policy = policy;
        self.updated(index);
        Ok(())
    }

    /// Removes an action. The window binding at index 0 is refused.
    pub fn delete_action(&mut self, id: &str) -> Result<ActionInstance> {
        let index = self.index_of(id)?;
        if index == 0 && self.actions[0].is_window_action {
            return Err(RecorderError::ProtectedAction(id.to_string()));
        }
        let removed = self.actions.remove(index);
        self.emit(SessionUpdate::ActionRemoved {
            id: removed.id.clone(),
        });
        debug!("Removed {} ({})", removed.id, removed.variable_name);
        Ok(removed)
    }

    /// Resolves the action's schema and checks its values. This is the only
    /// place captured values meet the schema.
    pub fn open_for_editing(&self, id: &str) -> Result<ActionEditor> {
        let index = self.index_of(id)?;
        let action = &self.actions[index];
        let schema = self.registry.resolve(&action.action_type);
        let values = action.editor_values();
        let visible = visible_fields(&schema, &values)
            .into_iter()
            .cloned()
            .collect();
        let issues = validate(&schema, &values);
        if !issues.is_empty() {
            debug!("{} has {} field issue(s)", action.id, issues.len());
        }

        Ok(ActionEditor {
            action: action.clone(),
            visible_fields: visible,
            common_fields: self.registry.common_fields().to_vec(),
            common_values: action.policy.common_values(),
            values,
            issues,
            schema: (*schema).clone(),
        })
    }

    // ---- serialization -----------------------------------------------

    /// The `jsonForm` of the session. Available once a workflow name is set.
    pub fn to_document(&self) -> Result<WorkflowDocument> {
        if self.workflow_name.is_empty() {
            return Err(RecorderError::MissingWorkflowName);
        }
        let mut document = WorkflowDocument::new(
            self.workflow_id.clone(),
            self.workflow_name.clone(),
            self.description.clone(),
            self.target_window.clone(),
            self.window_variable_name.clone(),
            self.actions.clone(),
        );
        document.created_at = self.created_at;
        Ok(document)
    }

    /// The `.wfl` file name and bytes of the session.
    pub fn export(&self) -> Result<(String, Vec<u8>)> {
        let document = self.to_document()?;
        Ok((document.export_file_name(), wfl::encode_workflow(&document)?))
    }

    // ---- internals ---------------------------------------------------

    fn expect(&self, allowed: &[SessionState], requested: &'static str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            warn!("Refused to {} while {}", requested, self.state);
            Err(RecorderError::InvalidTransition {
                from: self.state,
                requested,
            })
        }
    }

    fn transition(&mut self, to: SessionState) {
        let from = self.state;
        self.state = to;
        info!("Recording session: {} -> {}", from, to);
        self.emit(SessionUpdate::StateChanged { from, to });
    }

    fn close_capture(&mut self) {
        if !self.capture_open {
            return;
        }
        if let Err(e) = self.backend.send(CaptureCommand::EndCapture) {
            warn!("Could not tell the capture backend to stop: {}", e);
        }
        self.capture_open = false;
    }

    fn append(&mut self, action: ActionInstance) -> String {
        let id = action.id.clone();
        let index = self.actions.len();
        debug!(
            "Appended {} '{}' at {}",
            action.action_type, action.variable_name, index
        );
        self.actions.push(action);
        self.emit(SessionUpdate::ActionAdded {
            index,
            action: Box::new(self.actions[index].clone()),
        });
        id
    }

    fn updated(&mut self, index: usize) {
        self.emit(SessionUpdate::ActionUpdated {
            action: Box::new(self.actions[index].clone()),
        });
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.actions
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| RecorderError::ActionNotFound(id.to_string()))
    }

    fn emit(&self, update: SessionUpdate) {
        // no subscribers is fine
        let _ = self.updates.send(update);
    }
}

pub(crate) fn updates_as_stream(
    mut rx: broadcast::Receiver<SessionUpdate>,
) -> impl Stream<Item = SessionUpdate> {
    Box::pin(async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(update) => yield update,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Session update stream lagged, skipped {} updates", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
