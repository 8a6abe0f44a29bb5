use alqvimia_workflow_recorder::wfl::{bundle_file_name, BUNDLE_MAGIC};
use alqvimia_workflow_recorder::{
    decode_bundle, decode_value, decode_workflow, encode_bundle, encode_value, encode_workflow,
    import_workflows, ChannelBackend, RecorderConfig, RecorderError, RecordingSession,
    WindowDescriptor, WorkflowDocument, WFL_MAGIC,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

fn recorded_document(name: &str) -> WorkflowDocument {
    let (backend, _rx) = ChannelBackend::new();
    let mut session = RecordingSession::new(RecorderConfig::default(), Arc::new(backend));
    session.start().unwrap();
    session
        .select_window(WindowDescriptor::new("Portal - Chrome", "chrome.exe"))
        .unwrap();
    session.configure(name, "window_chrome", "nightly").unwrap();
    session
        .handle_raw(json!({
            "event": "element-captured",
            "tagName": "input",
            "selector": "#user",
            "text": "ada",
            "actionType": "type",
            "rect": {"x": 0.1, "y": 0.2, "width": 100.25, "height": 20.0}
        }))
        .unwrap();
    session
        .handle_raw(json!({
            "event": "element-captured",
            "controlType": "Button",
            "automationId": "btnSave",
            "name": "Save",
            "source": "native",
            "clickType": "dblclick",
            "x": 15.0,
            "y": 30.5
        }))
        .unwrap();
    session.stop().unwrap();
    session.to_document().unwrap()
}

#[test]
fn test_minimal_payload_encodes_with_envelope() {
    let encoded = encode_value(&json!({"name": "Test"})).unwrap();
    assert!(encoded.starts_with(WFL_MAGIC));

    let decoded = decode_value(encoded.as_bytes()).unwrap();
    assert_eq!(
        decoded,
        json!({
            "_wfl": {"version": "2.0", "format": "alqvimia-workflow"},
            "name": "Test"
        })
    );
}

#[test]
fn test_body_is_base64_of_utf8_json() {
    let encoded = encode_value(&json!({"name": "Überweisung ✓"})).unwrap();
    let body = encoded.strip_prefix(WFL_MAGIC).unwrap();
    let text = String::from_utf8(STANDARD.decode(body).unwrap()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["name"], "Überweisung ✓");
    assert_eq!(parsed["_wfl"]["format"], "alqvimia-workflow");
}

#[test]
fn test_recorded_workflow_round_trips_exactly() {
    let document = recorded_document("Login flow");
    assert_eq!(document.export_file_name(), "Login_flow.wfl");

    let bytes = encode_workflow(&document).unwrap();
    let decoded = decode_workflow(&bytes).unwrap();
    assert_eq!(decoded, document);

    assert_eq!(decoded.actions.len(), 3);
    assert_eq!(decoded.steps.len(), 3);
    assert_eq!(decoded.variables.len(), 3);
    assert_eq!(decoded.actions[2].action_type, "doubleClick");
    assert_eq!(decoded.steps[0].action, "window_focus");
}

#[test]
fn test_projections_are_rebuilt_both_ways() {
    let mut document = recorded_document("Trimmed");
    document.actions.pop();
    let decoded = decode_workflow(&encode_workflow(&document).unwrap()).unwrap();
    assert_eq!(decoded.actions.len(), 2);
    assert_eq!(decoded.variables.len(), 2);
    assert_eq!(decoded.steps.len(), 2);

    let mut stale = recorded_document("Stale").to_value().unwrap();
    stale["variables"] = json!([]);
    stale["steps"] = json!([]);
    let decoded = decode_workflow(encode_value(&stale).unwrap().as_bytes()).unwrap();
    assert_eq!(decoded.actions.len(), 3);
    assert_eq!(decoded.variables.len(), 3);
    assert_eq!(decoded.steps[1].params.variable, decoded.actions[1].variable_name);
}

#[test]
fn test_unknown_envelope_fields_are_ignored() {
    let document = recorded_document("Forward");
    let mut value = document.to_value().unwrap();
    value["layout"] = json!({"zoom": 1.5});
    let bytes = encode_value(&value).unwrap();

    let decoded = decode_workflow(bytes.as_bytes()).unwrap();
    assert_eq!(decoded.name, "Forward");
    assert_eq!(decoded.actions, document.actions);
}

#[test]
fn test_decode_rejects_bad_files() {
    let json_body = STANDARD.encode(b"{\"name\": \"x\"}");
    for bad in [
        format!("ALQWFL1{json_body}"),
        format!("ALQWFL2{}", STANDARD.encode(b"[1, 2]")),
        format!("ALQWFL2{}", STANDARD.encode(b"{broken")),
        "ALQWFL2%%%".to_string(),
        json_body,
    ] {
        assert!(
            matches!(
                decode_value(bad.as_bytes()),
                Err(RecorderError::CorruptWorkflowFile(_))
            ),
            "{bad}"
        );
    }
}

#[test]
fn test_bundle_round_trip() {
    let documents = vec![recorded_document("One"), recorded_document("Two")];
    let bytes = encode_bundle(&documents, Utc::now()).unwrap();
    assert!(bytes.starts_with(BUNDLE_MAGIC.as_bytes()));

    let decoded = decode_bundle(&bytes).unwrap();
    assert_eq!(decoded, documents);
    assert!(bundle_file_name(Utc::now()).ends_with(".alqzip"));
}

#[test]
fn test_import_detects_each_format_and_reassigns_ids() {
    let document = recorded_document("Imported");
    let original_id = document.id.clone();

    let from_wfl = import_workflows(&encode_workflow(&document).unwrap()).unwrap();
    let from_json = import_workflows(document.to_json().unwrap().as_bytes()).unwrap();
    let bundle = encode_bundle(&[document.clone(), document.clone()], Utc::now()).unwrap();
    let from_bundle = import_workflows(&bundle).unwrap();
    let array = serde_json::to_vec(&json!([document.to_value().unwrap()])).unwrap();
    let from_array = import_workflows(&array).unwrap();

    assert_eq!(from_wfl.len(), 1);
    assert_eq!(from_json.len(), 1);
    assert_eq!(from_bundle.len(), 2);
    assert_eq!(from_array.len(), 1);

    for imported in from_wfl
        .iter()
        .chain(&from_json)
        .chain(&from_bundle)
        .chain(&from_array)
    {
        assert_ne!(imported.id, original_id);
        assert!(imported.id.starts_with("wf_"));
        assert_eq!(imported.name, "Imported");
        assert_eq!(imported.actions, document.actions);
    }
    assert_ne!(from_bundle[0].id, from_bundle[1].id);
}

#[test]
fn test_import_rejects_json_without_name_or_actions() {
    for bad in [
        json!({"actions": []}),
        json!({"name": "No body"}),
        json!(42),
        json!([{"name": "ok", "actions": []}, {"description": "bad"}]),
    ] {
        let bytes = serde_json::to_vec(&bad).unwrap();
        assert!(
            matches!(
                import_workflows(&bytes),
                Err(RecorderError::CorruptWorkflowFile(_))
            ),
            "{bad}"
        );
    }
    assert!(import_workflows(b"not json at all").is_err());
}
