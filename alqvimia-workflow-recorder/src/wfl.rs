//! `.wfl` and `.alqzip` files.
//!
//! A `.wfl` file is the ASCII magic `ALQWFL2` followed directly by the
//! Base64 of the pretty-printed JSON envelope
//! `{"_wfl": {"version": "2.0", "format": "alqvimia-workflow"}, ...}`.
//! An `.alqzip` bundle is `ALQZIP1` followed by the Base64 of
//! `{"_export": {...}, "workflows": [...]}`. Neither has a checksum or
//! compression. Readers ignore envelope fields they do not know.

use crate::error::{RecorderError, Result};
use crate::normalize::to_base36;
use crate::workflow::WorkflowDocument;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

pub const WFL_MAGIC: &str = "ALQWFL2";
pub const BUNDLE_MAGIC: &str = "ALQZIP1";
pub const FORMAT_VERSION: &str = "2.0";
pub const WFL_FORMAT: &str = "alqvimia-workflow";
pub const BUNDLE_FORMAT: &str = "alqvimia-export";

fn corrupt(reason: impl std::fmt::Display) -> RecorderError {
    RecorderError::CorruptWorkflowFile(reason.to_string())
}

/// Wraps `payload` (a JSON object) in the `.wfl` envelope. `_wfl` comes
/// first; any `_wfl` already in the payload is replaced.
pub fn envelope(payload: &Value) -> Result<Value> {
    let fields = payload
        .as_object()
        .ok_or_else(|| corrupt("a workflow must be a JSON object"))?;
    let mut wrapped = Map::new();
    wrapped.insert(
        "_wfl".into(),
        json!({"version": FORMAT_VERSION, "format": WFL_FORMAT}),
    );
    for (key, value) in fields {
        if key != "_wfl" {
            wrapped.insert(key.clone(), value.clone());
        }
    }
    Ok(Value::Object(wrapped))
}

fn pack(magic: &str, payload: &Value) -> Result<String> {
    let text = serde_json::to_string_pretty(payload)?;
    Ok(format!("{magic}{}", STANDARD.encode(text.as_bytes())))
}

fn unpack(magic: &str, bytes: &[u8]) -> Result<Value> {
    let body = bytes
        .trim_ascii()
        .strip_prefix(magic.as_bytes())
        .ok_or_else(|| corrupt(format!("missing {magic} header")))?;
    let decoded = STANDARD
        .decode(body)
        .map_err(|e| corrupt(format!("invalid base64: {e}")))?;
    let text = String::from_utf8(decoded).map_err(|e| corrupt(format!("invalid UTF-8: {e}")))?;
    serde_json::from_str(&text).map_err(|e| corrupt(format!("invalid JSON: {e}")))
}

/// Encodes any JSON object as a `.wfl` string.
pub fn encode_value(payload: &Value) -> Result<String> {
    pack(WFL_MAGIC, &envelope(payload)?)
}

/// Decodes a `.wfl` byte sequence back to its envelope.
pub fn decode_value(bytes: &[u8]) -> Result<Value> {
    let value = unpack(WFL_MAGIC, bytes)?;
    if !value.is_object() {
        return Err(corrupt("envelope is not a JSON object"));
    }
    Ok(value)
}

pub fn encode_workflow(document: &WorkflowDocument) -> Result<Vec<u8>> {
    let encoded = encode_value(&document.to_value()?)?;
    debug!(
        "Encoded workflow '{}' ({} actions, {} bytes)",
        document.name,
        document.actions.len(),
        encoded.len()
    );
    Ok(encoded.into_bytes())
}

pub fn decode_workflow(bytes: &[u8]) -> Result<WorkflowDocument> {
    document_from_value(decode_value(bytes)?)
}

fn document_from_value(mut value: Value) -> Result<WorkflowDocument> {
    if let Some(fields) = value.as_object_mut() {
        fields.remove("_wfl");
    }
    let mut document: WorkflowDocument =
        serde_json::from_value(value).map_err(|e| corrupt(format!("invalid workflow: {e}")))?;
    document.refresh_projections();
    Ok(document)
}

/// Packs several workflows into one `.alqzip` bundle.
pub fn encode_bundle(
    documents: &[WorkflowDocument],
    exported_at: DateTime<Utc>,
) -> Result<Vec<u8>> {
    let workflows = documents
        .iter()
        .map(WorkflowDocument::to_value)
        .collect::<serde_json::Result<Vec<_>>>()?;
    let payload = json!({
        "_export": {
            "version": FORMAT_VERSION,
            "format": BUNDLE_FORMAT,
            "exportedAt": exported_at.to_rfc3339(),
            "count": workflows.len(),
        },
        "workflows": workflows,
    });
    Ok(pack(BUNDLE_MAGIC, &payload)?.into_bytes())
}

pub fn decode_bundle(bytes: &[u8]) -> Result<Vec<WorkflowDocument>> {
    bundle_documents(unpack(BUNDLE_MAGIC, bytes)?)
}

fn bundle_documents(mut payload: Value) -> Result<Vec<WorkflowDocument>> {
    match payload.get_mut("workflows").map(Value::take) {
        Some(Value::Array(items)) => items.into_iter().map(document_from_value).collect(),
        _ => Err(corrupt("bundle has no workflows array")),
    }
}

/// File name the designer gives a bundle exported on `day`
pub fn bundle_file_name(day: DateTime<Utc>) -> String {
    format!("alqvimia_export_{}.alqzip", day.format("%Y-%m-%d"))
}

/// Reads whatever the user picked: an `.alqzip` bundle, a `.wfl` file, or
/// plain JSON (one workflow or an array of them).
///
/// Imported workflows get fresh ids so they never overwrite existing ones.
/// Nothing is returned unless every workflow in the input decodes.
pub fn import_workflows(bytes: &[u8]) -> Result<Vec<WorkflowDocument>> {
    let trimmed = bytes.trim_ascii();
    let mut documents = if trimmed.starts_with(BUNDLE_MAGIC.as_bytes()) {
        decode_bundle(trimmed)?
    } else if trimmed.starts_with(WFL_MAGIC.as_bytes()) {
        vec![decode_workflow(trimmed)?]
    } else {
        let value: Value = serde_json::from_slice(trimmed)
            .map_err(|e| corrupt(format!("not a workflow file: {e}")))?;
        let is_bundle = value.get("workflows").is_some_and(Value::is_array);
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(plain_document)
                .collect::<Result<Vec<_>>>()?,
            Value::Object(_) if is_bundle => bundle_documents(value)?,
            Value::Object(_) => vec![plain_document(value)?],
            _ => return Err(corrupt("not a workflow file")),
        }
    };

    let now = Utc::now();
    for (index, document) in documents.iter_mut().enumerate() {
        document.id = format!(
            "wf_{}_{}",
            now.timestamp_millis(),
            to_base36(index as u64 + 1)
        );
    }
    info!("Imported {} workflow(s)", documents.len());
    Ok(documents)
}

/// Plain JSON needs at least a name and some actions or steps.
fn plain_document(value: Value) -> Result<WorkflowDocument> {
    let has_name = value
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|n| !n.is_empty());
    let has_body = value.get("actions").is_some_and(Value::is_array)
        || value.get("steps").is_some_and(Value::is_array);
    if !has_name || !has_body {
        return Err(corrupt("JSON workflow needs a name and actions"));
    }
    document_from_value(value)
}
