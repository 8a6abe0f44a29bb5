use alqvimia_workflow_recorder::{
    CaptureCommand, ChannelBackend, EventOutcome, MemorySink, RecorderConfig, RecorderError,
    RecordingSession, SessionHandle, SessionState, SessionUpdate, WindowDescriptor,
    WorkflowDocument,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::StreamExt;

fn new_session() -> (
    RecordingSession,
    Arc<ChannelBackend>,
    UnboundedReceiver<CaptureCommand>,
) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let (backend, rx) = ChannelBackend::new();
    let backend = Arc::new(backend);
    let session = RecordingSession::new(RecorderConfig::default(), backend.clone());
    (session, backend, rx)
}

fn recording_session() -> (RecordingSession, UnboundedReceiver<CaptureCommand>) {
    let (mut session, _backend, rx) = new_session();
    session.start().unwrap();
    session
        .select_window(WindowDescriptor::new("Invoices - Excel", "EXCEL.EXE"))
        .unwrap();
    session
        .configure("Invoice run", "window_excel", "monthly")
        .unwrap();
    (session, rx)
}

fn drain(rx: &mut UnboundedReceiver<CaptureCommand>) -> Vec<CaptureCommand> {
    let mut commands = Vec::new();
    while let Ok(command) = rx.try_recv() {
        commands.push(command);
    }
    commands
}

fn input_capture() -> Value {
    json!({
        "event": "element-captured",
        "tagName": "input",
        "type": "text",
        "id": "amount",
        "selector": "#amount",
        "text": "42.50",
        "actionType": "type",
        "rect": {"x": 10.5, "y": 20.0, "width": 120.0, "height": 24.0}
    })
}

fn is_variable_for(name: &str, tag: &str) -> bool {
    name.strip_prefix(tag)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|suffix| {
            !suffix.is_empty()
                && suffix
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        })
}

#[test]
fn test_only_start_leaves_idle() {
    let (mut session, _backend, _rx) = new_session();

    assert!(matches!(
        session.pause(),
        Err(RecorderError::InvalidTransition { .. })
    ));
    assert!(matches!(
        session.resume(),
        Err(RecorderError::InvalidTransition { .. })
    ));
    assert!(matches!(
        session.stop(),
        Err(RecorderError::InvalidTransition { .. })
    ));
    assert!(matches!(
        session.configure("x", "window_x", ""),
        Err(RecorderError::InvalidTransition { .. })
    ));
    assert!(session
        .select_window(WindowDescriptor::new("Notepad", "notepad.exe"))
        .is_err());
    assert_eq!(session.state(), SessionState::Idle);

    session.start().unwrap();
    assert_eq!(session.state(), SessionState::SelectingWindow);
}

#[test]
fn test_start_refused_without_backend() {
    let (mut session, backend, _rx) = new_session();
    backend.disconnect();

    assert!(matches!(
        session.start(),
        Err(RecorderError::BackendUnavailable)
    ));
    assert_eq!(session.state(), SessionState::Idle);

    backend.reconnect();
    session.start().unwrap();
}

#[test]
fn test_configure_requires_name_and_variable() {
    let (mut session, _backend, mut rx) = new_session();
    session.start().unwrap();
    let suggestion = session
        .select_window(WindowDescriptor::new("Untitled - Notepad", "notepad.exe"))
        .unwrap();
    assert_eq!(suggestion, "window_notepad");

    assert!(matches!(
        session.configure("  ", "window_notepad", ""),
        Err(RecorderError::MissingWorkflowName)
    ));
    assert!(matches!(
        session.configure("Notes", "", ""),
        Err(RecorderError::MissingWindowVariable)
    ));
    assert_eq!(session.state(), SessionState::ConfiguringWorkflow);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_existing_variable_can_be_the_target_window() {
    let (mut session, _backend, _rx) = new_session();
    session.start().unwrap();

    assert!(matches!(
        session.select_variable_as_window(" !! "),
        Err(RecorderError::InvalidVariableName(_))
    ));
    assert_eq!(session.state(), SessionState::SelectingWindow);

    let suggestion = session.select_variable_as_window("$crm_window").unwrap();
    assert_eq!(suggestion, "crm_window");
    assert_eq!(session.state(), SessionState::ConfiguringWorkflow);

    session.configure("CRM sync", &suggestion, "").unwrap();
    let binding = &session.actions()[0];
    assert_eq!(binding.variable_name, "crm_window");
    assert_eq!(
        binding.window.as_ref().unwrap().variable_name.as_deref(),
        Some("crm_window")
    );
}

#[test]
fn test_configure_binds_the_window_first() {
    let (session, mut rx) = recording_session();

    assert_eq!(session.state(), SessionState::Recording);
    assert_eq!(session.actions().len(), 1);
    let binding = &session.actions()[0];
    assert!(binding.is_window_action);
    assert_eq!(binding.action_type, "window");
    assert_eq!(binding.variable_name, "window_excel");
    assert_eq!(binding.values["activate"], json!(true));
    assert_eq!(binding.values["timeout"], json!(15000));
    assert_eq!(
        binding.window.as_ref().unwrap().title.as_deref(),
        Some("Invoices - Excel")
    );

    let commands = drain(&mut rx);
    assert_eq!(commands.len(), 1);
    assert!(matches!(
        &commands[0],
        CaptureCommand::BeginCapture { workflow_name, .. } if workflow_name == "Invoice run"
    ));
}

#[test]
fn test_text_input_capture_becomes_type_action() {
    let (mut session, _rx) = recording_session();

    let outcome = session.handle_raw(input_capture()).unwrap();
    let EventOutcome::Appended(id) = outcome else {
        panic!("expected an appended action, got {outcome:?}");
    };

    let action = session.action(&id).unwrap();
    assert_eq!(action.action_type, "type");
    assert_eq!(action.policy.clear_before, Some(true));
    assert_eq!(action.policy.send_enter, Some(false));
    assert_eq!(action.values["text"], json!("42.50"));
    assert_eq!(action.values["selector"], json!("#amount"));
    assert!(
        is_variable_for(&action.variable_name, "input"),
        "{}",
        action.variable_name
    );
    let bounds = action.element.as_ref().unwrap().bounds.unwrap();
    assert_eq!(bounds.x, 10.5);
}

#[test]
fn test_captures_keep_arrival_order_with_distinct_variables() {
    let (mut session, _rx) = recording_session();

    for selector in ["#a", "#b", "#c"] {
        session
            .handle_raw(json!({
                "event": "element-captured",
                "tagName": "button",
                "selector": selector,
                "clickType": "left"
            }))
            .unwrap();
    }

    let actions = session.actions();
    assert_eq!(actions.len(), 4);
    let selectors: Vec<_> = actions[1..]
        .iter()
        .map(|a| a.values["selector"].as_str().unwrap())
        .collect();
    assert_eq!(selectors, vec!["#a", "#b", "#c"]);
    assert!(actions[1..].iter().all(|a| a.action_type == "click"));

    let mut names: Vec<_> = actions.iter().map(|a| a.variable_name.clone()).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 4);
}

#[test]
fn test_malformed_capture_is_rejected_whole() {
    let (mut session, _rx) = recording_session();

    for bad in [
        json!({"event": "element-captured", "selector": "#no-tag"}),
        json!({"event": "element-captured", "tagName": "div"}),
        json!({"event": "teleported"}),
        json!("click"),
    ] {
        assert!(
            matches!(
                session.handle_raw(bad.clone()),
                Err(RecorderError::MalformedCaptureEvent(_))
            ),
            "{bad}"
        );
    }
    assert_eq!(session.actions().len(), 1);
    assert_eq!(session.state(), SessionState::Recording);
}

#[test]
fn test_captures_while_paused_are_dropped() {
    let (mut session, _rx) = recording_session();
    let mut updates = session.subscribe();

    session.pause().unwrap();
    let outcome = session.handle_raw(input_capture()).unwrap();
    assert_eq!(outcome, EventOutcome::Dropped);
    assert_eq!(session.actions().len(), 1);

    let mut saw_drop = false;
    while let Ok(update) = updates.try_recv() {
        if let SessionUpdate::EventDropped { reason, .. } = update {
            assert_eq!(reason, "paused");
            saw_drop = true;
        }
    }
    assert!(saw_drop);

    session.resume().unwrap();
    assert!(matches!(
        session.handle_raw(input_capture()).unwrap(),
        EventOutcome::Appended(_)
    ));
}

#[test]
fn test_pause_and_resume_signal_once() {
    let (mut session, mut rx) = recording_session();
    drain(&mut rx);

    session.pause().unwrap();
    session.pause().unwrap();
    session.resume().unwrap();
    session.resume().unwrap();

    assert_eq!(
        drain(&mut rx),
        vec![CaptureCommand::Pause, CaptureCommand::Resume]
    );
}

#[test]
fn test_stop_is_idempotent_and_final() {
    let (mut session, mut rx) = recording_session();
    session.handle_raw(input_capture()).unwrap();
    drain(&mut rx);

    session.stop().unwrap();
    let before: Vec<_> = session.actions().to_vec();
    session.stop().unwrap();

    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(session.actions(), &before[..]);
    assert_eq!(drain(&mut rx), vec![CaptureCommand::EndCapture]);

    assert!(session.resume().is_err());
    assert!(session.configure("again", "window_x", "").is_err());
    assert!(session.pause().is_err());
    assert_eq!(
        session.handle_raw(input_capture()).unwrap(),
        EventOutcome::Ignored
    );
    assert_eq!(session.actions().len(), before.len());
}

#[test]
fn test_backend_stop_event_skips_end_capture() {
    let (mut session, mut rx) = recording_session();
    drain(&mut rx);

    let outcome = session
        .handle_raw(json!({"event": "session-stopped", "reason": "browser closed"}))
        .unwrap();
    assert_eq!(outcome, EventOutcome::Transitioned(SessionState::Stopped));
    assert!(!session.is_capture_open());

    session.stop().unwrap();
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_stop_commits_when_backend_is_gone() {
    let (backend, mut rx) = ChannelBackend::new();
    let backend = Arc::new(backend);
    let mut session = RecordingSession::new(RecorderConfig::default(), backend.clone());
    session.start().unwrap();
    session
        .select_window(WindowDescriptor::new("Orders", "erp.exe"))
        .unwrap();
    session.configure("Orders", "window_erp", "").unwrap();
    drain(&mut rx);

    backend.disconnect();
    session.stop().unwrap();
    assert_eq!(session.state(), SessionState::Stopped);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_window_switch_while_recording_appends_window_step() {
    let (mut session, _rx) = recording_session();

    session
        .handle_raw(json!({
            "event": "window-selected",
            "title": "Inbox - Outlook",
            "processName": "OUTLOOK.EXE"
        }))
        .unwrap();

    let switch = session.actions().last().unwrap();
    assert!(switch.is_window_action);
    assert!(is_variable_for(&switch.variable_name, "outlook"));
    assert_eq!(session.window_variable_name(), "window_excel");
}

#[test]
fn test_window_binding_is_protected_but_renamable() {
    let (mut session, _rx) = recording_session();
    let binding_id = session.actions()[0].id.clone();

    assert!(matches!(
        session.delete_action(&binding_id),
        Err(RecorderError::ProtectedAction(_))
    ));
    assert_eq!(
        session.rename_variable(&binding_id, "main window!").unwrap(),
        "mainwindow"
    );
    assert_eq!(session.window_variable_name(), "mainwindow");
    assert!(matches!(
        session.rename_variable(&binding_id, "!!!"),
        Err(RecorderError::InvalidVariableName(_))
    ));
}

#[test]
fn test_manual_step_gets_schema_defaults_and_editor() {
    let (mut session, _rx) = recording_session();
    session.stop().unwrap();

    let mut values = Map::new();
    values.insert("url".into(), json!("https://example.com"));
    let id = session.add_manual_action("navigate", values).unwrap();

    let editor = session.open_for_editing(&id).unwrap();
    assert_eq!(editor.action.values["url"], json!("https://example.com"));
    assert!(!editor.visible_fields.is_empty());
    assert!(!editor.common_fields.is_empty());
    assert_eq!(editor.common_values["retryCount"], json!(3));

    let mut patch = Map::new();
    patch.insert("url".into(), Value::Null);
    patch.insert("retryCount".into(), json!(5));
    session.update_values(&id, patch).unwrap();
    let action = session.action(&id).unwrap();
    assert!(!action.values.contains_key("url"));
    assert_eq!(action.policy.retry_count, 5);

    let removed = session.delete_action(&id).unwrap();
    assert_eq!(removed.id, id);
    assert!(matches!(
        session.open_for_editing(&id),
        Err(RecorderError::ActionNotFound(_))
    ));
}

#[test]
fn test_discard_returns_to_idle_from_anywhere() {
    let (mut session, mut rx) = recording_session();
    drain(&mut rx);

    session.discard();
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.actions().is_empty());
    assert!(session.target_window().is_none());
    assert_eq!(drain(&mut rx), vec![CaptureCommand::EndCapture]);

    assert!(matches!(
        session.to_document(),
        Err(RecorderError::MissingWorkflowName)
    ));
}

#[test]
fn test_restore_from_studio_steps() {
    let document: WorkflowDocument = serde_json::from_value(json!({
        "id": "wf_1700000000000",
        "name": "Legacy",
        "targetWindow": {"title": "Portal", "processName": "chrome.exe", "type": "browser"},
        "windowVariable": "window_chrome",
        "steps": [
            {"id": "s1", "action": "web_click", "label": "Click: Submit",
             "params": {"selector": "#submit"}},
            {"id": "s2", "action": "web_type", "label": "Type: name",
             "params": {"selector": "#name", "text": "Ada"}}
        ]
    }))
    .unwrap();

    let (backend, mut rx) = ChannelBackend::new();
    let mut session =
        RecordingSession::restore(&document, RecorderConfig::default(), Arc::new(backend))
            .unwrap();

    assert_eq!(session.state(), SessionState::Paused);
    assert_eq!(session.workflow_id(), "wf_1700000000000");
    let types: Vec<_> = session
        .actions()
        .iter()
        .map(|a| a.action_type.as_str())
        .collect();
    assert_eq!(types, vec!["window", "click", "type"]);
    assert_eq!(session.actions()[0].variable_name, "window_chrome");

    session.resume().unwrap();
    assert!(matches!(
        drain(&mut rx).as_slice(),
        [CaptureCommand::BeginCapture { .. }]
    ));
}

#[test]
fn test_restore_needs_a_window() {
    let document: WorkflowDocument = serde_json::from_value(json!({
        "name": "Orphan",
        "steps": [{"id": "s1", "action": "web_click", "label": "Click", "params": {}}]
    }))
    .unwrap();
    let (backend, _rx) = ChannelBackend::new();
    assert!(matches!(
        RecordingSession::restore(&document, RecorderConfig::default(), Arc::new(backend)),
        Err(RecorderError::NoTargetWindow)
    ));
}

#[tokio::test]
async fn test_handle_serializes_events_and_edits() {
    let (backend, mut rx) = ChannelBackend::new();
    let session = RecordingSession::new(RecorderConfig::default(), Arc::new(backend));
    let sink = MemorySink::new();
    let handle = SessionHandle::spawn(session, Arc::new(sink.clone()));
    let mut updates = handle.update_stream();

    handle.start().await.unwrap();
    handle
        .select_window(WindowDescriptor::new("Orders", "erp.exe"))
        .await
        .unwrap();
    handle.configure("Orders", "window_erp", "").await.unwrap();

    let events = tokio_stream::iter(vec![input_capture(), input_capture()]);
    handle.forward_events(events).await.unwrap();
    handle.stop().await.unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, SessionState::Stopped);
    assert_eq!(snapshot.actions.len(), 3);

    let name = handle.export().await.unwrap();
    assert_eq!(name, "Orders.wfl");
    let (saved_name, bytes) = sink.last().unwrap();
    assert_eq!(saved_name, "Orders.wfl");
    assert!(bytes.starts_with(b"ALQWFL2"));

    let commands = drain(&mut rx);
    let begins = commands
        .iter()
        .filter(|c| matches!(c, CaptureCommand::BeginCapture { .. }))
        .count();
    let ends = commands
        .iter()
        .filter(|c| matches!(c, CaptureCommand::EndCapture))
        .count();
    assert_eq!((begins, ends), (1, 1));

    let first = tokio::time::timeout(Duration::from_secs(1), updates.next())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        first,
        SessionUpdate::StateChanged {
            from: SessionState::Idle,
            to: SessionState::SelectingWindow,
        }
    );
}

#[tokio::test]
async fn test_handle_save_writes_json_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _rx) = recording_session();
    session.handle_raw(input_capture()).unwrap();
    let workflow_id = session.workflow_id().to_string();

    let sink = alqvimia_workflow_recorder::DirectorySink::new(dir.path());
    let handle = SessionHandle::spawn(session, Arc::new(sink));
    let name = handle.save().await.unwrap();
    assert_eq!(name, format!("{workflow_id}.json"));

    let path = dir.path().join(&name);
    let mut text = None;
    for _ in 0..50 {
        if let Ok(contents) = std::fs::read_to_string(&path) {
            if !contents.is_empty() {
                text = Some(contents);
                break;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let document: WorkflowDocument = serde_json::from_str(&text.unwrap()).unwrap();
    assert_eq!(document.name, "Invoice run");
    assert_eq!(document.actions.len(), 2);
    assert_eq!(document.steps.len(), 2);
    assert_eq!(document.variables[0].name, "window_excel");
}
