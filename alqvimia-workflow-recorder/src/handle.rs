//! Runs a [`RecordingSession`] on its own task.
//!
//! Capture events and user edits are both messages on one queue, so the
//! session has a single writer and actions keep arrival order.

use crate::action::{ActionInstance, ExecutionPolicy};
use crate::error::{RecorderError, Result};
use crate::events::WindowDescriptor;
use crate::session::{
    updates_as_stream, ActionEditor, EventOutcome, RecordingSession, SessionState, SessionUpdate,
};
use crate::sink::WorkflowSink;
use crate::workflow::WorkflowDocument;
use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type Reply<T> = oneshot::Sender<Result<T>>;

/// Read-only view of the session at one point in time
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub workflow_name: String,
    pub window_variable_name: String,
    pub target_window: Option<WindowDescriptor>,
    pub actions: Vec<ActionInstance>,
    pub capture_open: bool,
    pub last_error: Option<String>,
}

enum SessionCommand {
    Start(Reply<()>),
    SelectWindow(WindowDescriptor, Reply<String>),
    Configure {
        workflow_name: String,
        window_variable: String,
        description: String,
        reply: Reply<()>,
    },
    Pause(Reply<()>),
    Resume(Reply<()>),
    Stop(Reply<()>),
    Discard(Reply<()>),
    Event(Value, Reply<EventOutcome>),
    AddManual {
        action_type: String,
        values: Map<String, Value>,
        reply: Reply<String>,
    },
    Rename {
        id: String,
        name: String,
        reply: Reply<String>,
    },
    UpdateValues {
        id: String,
        patch: Map<String, Value>,
        reply: Reply<()>,
    },
    SetPolicy {
        id: String,
        policy: ExecutionPolicy,
        reply: Reply<()>,
    },
    Delete(String, Reply<ActionInstance>),
    OpenForEditing(String, Reply<ActionEditor>),
    Snapshot(Reply<SessionSnapshot>),
    Document(Reply<WorkflowDocument>),
    Save(Reply<String>),
    Export(Reply<String>),
}

/// Cloneable handle to a session running on a tokio task.
///
/// The task ends when the last handle is dropped.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionCommand>,
    updates: broadcast::Sender<SessionUpdate>,
}

impl SessionHandle {
    /// Moves `session` onto a new task. Saved and exported files go to `sink`.
    pub fn spawn(session: RecordingSession, sink: Arc<dyn WorkflowSink>) -> Self {
        let (tx, rx) = mpsc::channel(session.config().event_buffer.max(1));
        let updates = session.update_sender();
        tokio::spawn(run(session, rx, sink));
        Self { tx, updates }
    }

    /// Get a stream of session updates
    pub fn update_stream(&self) -> impl Stream<Item = SessionUpdate> {
        updates_as_stream(self.updates.subscribe())
    }

    async fn call<T>(&self, command: impl FnOnce(Reply<T>) -> SessionCommand) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| RecorderError::SessionClosed)?;
        rx.await.map_err(|_| RecorderError::SessionClosed)?
    }

    pub async fn start(&self) -> Result<()> {
        self.call(SessionCommand::Start).await
    }

    pub async fn select_window(&self, window: WindowDescriptor) -> Result<String> {
        self.call(|reply| SessionCommand::SelectWindow(window, reply))
            .await
    }

    pub async fn configure(
        &self,
        workflow_name: &str,
        window_variable: &str,
        description: &str,
    ) -> Result<()> {
        self.call(|reply| SessionCommand::Configure {
            workflow_name: workflow_name.to_string(),
            window_variable: window_variable.to_string(),
            description: description.to_string(),
            reply,
        })
        .await
    }

    pub async fn pause(&self) -> Result<()> {
        self.call(SessionCommand::Pause).await
    }

    pub async fn resume(&self) -> Result<()> {
        self.call(SessionCommand::Resume).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.call(SessionCommand::Stop).await
    }

    pub async fn discard(&self) -> Result<()> {
        self.call(SessionCommand::Discard).await
    }

    /// Queues one raw capture event behind everything already queued.
    pub async fn push_event(&self, event: Value) -> Result<EventOutcome> {
        self.call(|reply| SessionCommand::Event(event, reply)).await
    }

    /// Feeds a transport's event stream into the session, in order. Bad
    /// events are logged and skipped; the task ends with the stream or the
    /// session.
    pub fn forward_events<S>(&self, events: S) -> JoinHandle<()>
    where
        S: Stream<Item = Value> + Send + 'static,
    {
        let handle = self.clone();
        tokio::spawn(async move {
            let mut events = Box::pin(events);
            while let Some(event) = events.next().await {
                match handle.push_event(event).await {
                    Ok(outcome) => debug!("Capture event applied: {:?}", outcome),
                    Err(RecorderError::SessionClosed) => break,
                    Err(e) => debug!("Capture event rejected: {}", e),
                }
            }
        })
    }

    pub async fn add_manual_action(
        &self,
        action_type: &str,
        values: Map<String, Value>,
    ) -> Result<String> {
        self.call(|reply| SessionCommand::AddManual {
            action_type: action_type.to_string(),
            values,
            reply,
        })
        .await
    }

    pub async fn rename_variable(&self, id: &str, name: &str) -> Result<String> {
        self.call(|reply| SessionCommand::Rename {
            id: id.to_string(),
            name: name.to_string(),
            reply,
        })
        .await
    }

    pub async fn update_values(&self, id: &str, patch: Map<String, Value>) -> Result<()> {
        self.call(|reply| SessionCommand::UpdateValues {
            id: id.to_string(),
            patch,
            reply,
        })
        .await
    }

    pub async fn set_policy(&self, id: &str, policy: ExecutionPolicy) -> Result<()> {
        self.call(|reply| SessionCommand::SetPolicy {
            id: id.to_string(),
            policy,
            reply,
        })
        .await
    }

    pub async fn delete_action(&self, id: &str) -> Result<ActionInstance> {
        self.call(|reply| SessionCommand::Delete(id.to_string(), reply))
            .await
    }

    pub async fn open_for_editing(&self, id: &str) -> Result<ActionEditor> {
        self.call(|reply| SessionCommand::OpenForEditing(id.to_string(), reply))
            .await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot> {
        self.call(SessionCommand::Snapshot).await
    }

    pub async fn document(&self) -> Result<WorkflowDocument> {
        self.call(SessionCommand::Document).await
    }

    /// Hands the `jsonForm` to the sink as `<id>.json`. Returns the name;
    /// the write itself is not awaited.
    pub async fn save(&self) -> Result<String> {
        self.call(SessionCommand::Save).await
    }

    /// Hands the `.wfl` file to the sink. Returns the file name; the write
    /// itself is not awaited.
    pub async fn export(&self) -> Result<String> {
        self.call(SessionCommand::Export).await
    }
}

fn respond<T>(session: &mut RecordingSession, reply: Reply<T>, result: Result<T>) {
    if let Err(e) = &result {
        warn!("Recording session: {}", e);
        session.record_error(e);
    }
    // the caller may have given up waiting
    let _ = reply.send(result);
}

async fn run(
    mut session: RecordingSession,
    mut rx: mpsc::Receiver<SessionCommand>,
    sink: Arc<dyn WorkflowSink>,
) {
    info!("Recording session task started");
    while let Some(command) = rx.recv().await {
        match command {
            SessionCommand::Start(reply) => {
                let result = session.start();
                respond(&mut session, reply, result);
            }
            SessionCommand::SelectWindow(window, reply) => {
                let result = session.select_window(window);
                respond(&mut session, reply, result);
            }
            SessionCommand::Configure {
                workflow_name,
                window_variable,
                description,
                reply,
            } => {
                let result = session.configure(&workflow_name, &window_variable, &description);
                respond(&mut session, reply, result);
            }
            SessionCommand::Pause(reply) => {
                let result = session.pause();
                respond(&mut session, reply, result);
            }
            SessionCommand::Resume(reply) => {
                let result = session.resume();
                respond(&mut session, reply, result);
            }
            SessionCommand::Stop(reply) => {
                let result = session.stop();
                respond(&mut session, reply, result);
            }
            SessionCommand::Discard(reply) => {
                session.discard();
                respond(&mut session, reply, Ok(()));
            }
            SessionCommand::Event(event, reply) => {
                let result = session.handle_raw(event);
                respond(&mut session, reply, result);
            }
            SessionCommand::AddManual {
                action_type,
                values,
                reply,
            } => {
                let result = session.add_manual_action(&action_type, values);
                respond(&mut session, reply, result);
            }
            SessionCommand::Rename { id, name, reply } => {
                let result = session.rename_variable(&id, &name);
                respond(&mut session, reply, result);
            }
            SessionCommand::UpdateValues { id, patch, reply } => {
                let result = session.update_values(&id, patch);
                respond(&mut session, reply, result);
            }
            SessionCommand::SetPolicy { id, policy, reply } => {
                let result = session.set_policy(&id, policy);
                respond(&mut session, reply, result);
            }
            SessionCommand::Delete(id, reply) => {
                let result = session.delete_action(&id);
                respond(&mut session, reply, result);
            }
            SessionCommand::OpenForEditing(id, reply) => {
                let result = session.open_for_editing(&id);
                respond(&mut session, reply, result);
            }
            SessionCommand::Snapshot(reply) => {
                let snapshot = SessionSnapshot {
                    state: session.state(),
                    workflow_name: session.workflow_name().to_string(),
                    window_variable_name: session.window_variable_name().to_string(),
                    target_window: session.target_window().cloned(),
                    actions: session.actions().to_vec(),
                    capture_open: session.is_capture_open(),
                    last_error: session.last_error().map(str::to_string),
                };
                let _ = reply.send(Ok(snapshot));
            }
            SessionCommand::Document(reply) => {
                let result = session.to_document();
                respond(&mut session, reply, result);
            }
            SessionCommand::Save(reply) => {
                let result = session.to_document().and_then(|document| {
                    let name = format!("{}.json", document.id);
                    sink.save(&name, document.to_json()?.into_bytes());
                    Ok(name)
                });
                respond(&mut session, reply, result);
            }
            SessionCommand::Export(reply) => {
                let result = session.export().map(|(name, bytes)| {
                    sink.save(&name, bytes);
                    name
                });
                respond(&mut session, reply, result);
            }
        }
    }
    info!("Recording session task ended");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ChannelBackend;
    use crate::config::RecorderConfig;
    use crate::sink::MemorySink;

    #[tokio::test]
    async fn test_errors_become_session_status() {
        let (backend, _rx) = ChannelBackend::new();
        let session = RecordingSession::new(RecorderConfig::default(), Arc::new(backend));
        let handle = SessionHandle::spawn(session, Arc::new(MemorySink::new()));

        let err = handle.pause().await.unwrap_err();
        assert!(matches!(err, RecorderError::InvalidTransition { .. }));

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state, SessionState::Idle);
        assert!(snapshot.last_error.unwrap().contains("pause"));
    }
}
