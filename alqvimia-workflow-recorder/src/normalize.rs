//! Turning raw captures into actions.

use crate::action::{new_action_id, ActionInstance, ExecutionPolicy};
use crate::config::RecorderConfig;
use crate::error::{RecorderError, Result};
use crate::events::{
    CaptureSource, ElementDescriptor, Position, RawCapture, WindowDescriptor, WindowKind,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::debug;

/// Stateful only in the disambiguator: two captures in the same millisecond
/// still get distinct variable names.
#[derive(Debug, Clone)]
pub struct Normalizer {
    config: RecorderConfig,
    last_stamp: u64,
}

impl Normalizer {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            last_stamp: 0,
        }
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn normalize(&mut self, raw: &RawCapture) -> ActionInstance {
        self.normalize_at(raw, Utc::now())
    }

    /// Builds the action for a captured element at time `now`.
    pub fn normalize_at(&mut self, raw: &RawCapture, now: DateTime<Utc>) -> ActionInstance {
        let action_type = canonical_action_type(
            raw.action_type
                .as_deref()
                .or(raw.click_type.as_deref())
                .unwrap_or("click"),
        );
        let element = ElementDescriptor::from_capture(raw, self.config.max_text_preview_len);
        let variable_name = format!(
            "{}_{}",
            identifier_part(&element.tag_name).unwrap_or_else(|| "elem".to_string()),
            self.disambiguator(now)
        );

        let mut policy = ExecutionPolicy::from_config(&self.config);
        let mut values = Map::new();
        if let Some(locator) = element.locator() {
            values.insert("selector".into(), json!(locator));
        }

        match action_type.as_str() {
            "type" | "input" => {
                policy.clear_before = Some(self.config.text_entry_clear_before);
                policy.send_enter = Some(false);
                values.insert("text".into(), json!(raw.text.clone().unwrap_or_default()));
            }
            "select" => {
                values.insert("selectBy".into(), json!("value"));
                values.insert(
                    "selectValue".into(),
                    json!(raw.value.clone().unwrap_or_default()),
                );
            }
            "click" | "doubleClick" | "right" => {
                policy.post_delay_ms = self.config.navigation_post_delay_ms;
            }
            _ => {}
        }

        let click_position = match (raw.x, raw.y) {
            (Some(x), Some(y)) => Some(Position { x, y }),
            _ => None,
        };

        debug!(
            "Normalized {} capture into {} ({})",
            element.tag_name, action_type, variable_name
        );

        ActionInstance {
            id: new_action_id(),
            action_type,
            variable_name,
            is_window_action: false,
            source: raw.source.unwrap_or_default(),
            element: Some(element),
            window: None,
            click_position,
            values,
            policy,
            timestamp: now,
        }
    }

    /// The binding step that heads every recorded workflow.
    pub fn window_action(
        &self,
        window: &WindowDescriptor,
        variable_name: &str,
        now: DateTime<Utc>,
    ) -> ActionInstance {
        let mut values = Map::new();
        values.insert("activate".into(), Value::Bool(true));
        values.insert("maximize".into(), Value::Bool(false));
        values.insert("minimize".into(), Value::Bool(false));
        values.insert("restore".into(), Value::Bool(false));
        values.insert("close".into(), Value::Bool(false));
        values.insert("waitForReady".into(), Value::Bool(true));
        values.insert(
            "timeout".into(),
            json!(self.config.system_timeout_secs * 1000),
        );
        values.insert("resizeWindow".into(), Value::Bool(self.config.resize_window));

        ActionInstance {
            id: format!("action_window_{}", uuid::Uuid::new_v4().simple()),
            action_type: "window".to_string(),
            variable_name: variable_name.to_string(),
            is_window_action: true,
            source: source_of(window),
            element: None,
            window: Some(window.clone()),
            click_position: None,
            values,
            policy: ExecutionPolicy::from_config(&self.config),
            timestamp: now,
        }
    }

    /// A window change reported while recording: a further window step named
    /// after the process.
    pub fn window_switch(
        &mut self,
        window: &WindowDescriptor,
        now: DateTime<Utc>,
    ) -> ActionInstance {
        let base = window
            .process_name
            .as_deref()
            .and_then(process_part)
            .unwrap_or_else(|| "window".to_string());
        let variable_name = format!("{}_{}", base, self.disambiguator(now));
        self.window_action(window, &variable_name, now)
    }

    /// `<base>_<disambiguator>`, with `base` reduced to `[a-z0-9_]`.
    pub fn variable_for(&mut self, base: &str, now: DateTime<Utc>) -> String {
        let base = identifier_part(base).unwrap_or_else(|| "step".to_string());
        format!("{}_{}", base, self.disambiguator(now))
    }

    fn disambiguator(&mut self, now: DateTime<Utc>) -> String {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let stamp = millis.max(self.last_stamp + 1);
        self.last_stamp = stamp;
        to_base36(stamp)
    }
}

/// Maps backend click names onto registered action types.
pub fn canonical_action_type(raw: &str) -> String {
    match raw {
        "left" | "leftClick" => "click",
        "double" | "dblclick" | "doubleclick" | "double_click" => "doubleClick",
        "rightClick" | "contextmenu" | "right_click" => "right",
        other => other,
    }
    .to_string()
}

/// Variable suggested for a chosen target window.
///
/// `window_<process>` with the process lower-cased and `.exe` dropped, or
/// `window_<id>` when no process is known. A variable chosen as the window
/// keeps its own name.
pub fn suggest_window_variable(window: &WindowDescriptor) -> String {
    if window.kind == WindowKind::Variable {
        if let Some(name) = window.variable_name.as_ref().filter(|n| !n.is_empty()) {
            return name.clone();
        }
    }
    if let Some(process) = window.process_name.as_deref().and_then(process_part) {
        return format!("window_{process}");
    }
    match window.id_string().and_then(|id| identifier_part(&id)) {
        Some(id) => format!("window_{id}"),
        None => "window".to_string(),
    }
}

/// Cleans a user-typed variable name down to `[A-Za-z0-9_]`.
pub fn sanitize_variable_name(name: &str) -> Result<String> {
    let cleaned: String = name
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if cleaned.is_empty() {
        Err(RecorderError::InvalidVariableName(name.to_string()))
    } else {
        Ok(cleaned)
    }
}

pub fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn process_part(process: &str) -> Option<String> {
    let lower = process.trim().to_lowercase();
    let stem = lower.strip_suffix(".exe").unwrap_or(&lower);
    identifier_part(stem)
}

/// Lower-cases and maps everything outside `[a-z0-9]` to single underscores.
fn identifier_part(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    for c in raw.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn source_of(window: &WindowDescriptor) -> CaptureSource {
    match window.kind {
        WindowKind::Browser => CaptureSource::Web,
        _ => CaptureSource::Native,
    }
}
