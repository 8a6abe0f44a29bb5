use crate::config::RecorderConfig;
use crate::events::{CaptureSource, ElementDescriptor, Position, WindowDescriptor};
use alqvimia_actions::ResolvedSchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

/// Execution metadata attached to every action.
///
/// Only recorded here; the execution engine is the one that honours it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPolicy {
    pub timeout_seconds: u64,
    pub retry_count: u32,
    pub retry_delay_ms: u64,
    pub continue_on_error: bool,
    pub pre_delay_ms: u64,
    pub post_delay_ms: u64,
    pub capture_screenshot_on_error: bool,
    /// Text entry only: clear the field before typing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_before: Option<bool>,
    /// Text entry only: press Enter after typing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_enter: Option<bool>,
}

impl Default for ExecutionPolicy {
    fn default() -> Self {
        Self::from_config(&RecorderConfig::default())
    }
}

impl ExecutionPolicy {
    pub fn from_config(config: &RecorderConfig) -> Self {
        Self {
            timeout_seconds: config.system_timeout_secs,
            retry_count: config.default_retry_count,
            retry_delay_ms: config.default_retry_delay_ms,
            continue_on_error: false,
            pre_delay_ms: config.default_pre_delay_ms,
            post_delay_ms: config.default_post_delay_ms,
            capture_screenshot_on_error: false,
            clear_before: None,
            send_enter: None,
        }
    }

    /// The policy as values of the shared execution fields
    /// (`timeout`, `retryCount`, `retryDelay`, ...).
    pub fn common_values(&self) -> Map<String, Value> {
        let mut values = Map::new();
        values.insert("timeout".into(), json!(self.timeout_seconds));
        values.insert("retryCount".into(), json!(self.retry_count));
        values.insert("retryDelay".into(), json!(self.retry_delay_ms));
        values.insert("continueOnError".into(), json!(self.continue_on_error));
        values.insert("waitBefore".into(), json!(self.pre_delay_ms));
        values.insert("waitAfter".into(), json!(self.post_delay_ms));
        values.insert(
            "screenshotOnError".into(),
            json!(self.capture_screenshot_on_error),
        );
        values
    }

    /// Applies one shared-field or text-entry value. Returns false when `key`
    /// is not a policy key or `value` has the wrong shape.
    pub fn apply(&mut self, key: &str, value: &Value) -> bool {
        match key {
            "timeout" => set_u64(&mut self.timeout_seconds, value),
            "retryCount" => match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(n) => {
                    self.retry_count = n;
                    true
                }
                None => false,
            },
            "retryDelay" => set_u64(&mut self.retry_delay_ms, value),
            "continueOnError" => set_bool(&mut self.continue_on_error, value),
            "waitBefore" => set_u64(&mut self.pre_delay_ms, value),
            "waitAfter" => set_u64(&mut self.post_delay_ms, value),
            "screenshotOnError" | "takeScreenshot" => {
                set_bool(&mut self.capture_screenshot_on_error, value)
            }
            "clearBefore" => set_flag(&mut self.clear_before, value),
            "sendEnter" => set_flag(&mut self.send_enter, value),
            _ => false,
        }
    }

    /// Policy recovered from a document that only stored flat properties.
    /// Recognised keys are moved out of `properties`; timeouts there are
    /// milliseconds.
    pub fn take_from_properties(properties: &mut Map<String, Value>) -> Self {
        let mut policy = Self::default();
        properties.retain(|key, value| {
            if key == "timeout" {
                return match value.as_u64() {
                    Some(ms) => {
                        policy.timeout_seconds = (ms / 1000).max(1);
                        false
                    }
                    None => true,
                };
            }
            !policy.apply(key, value)
        });
        policy
    }
}

fn set_u64(slot: &mut u64, value: &Value) -> bool {
    match value.as_u64() {
        Some(n) => {
            *slot = n;
            true
        }
        None => false,
    }
}

fn set_bool(slot: &mut bool, value: &Value) -> bool {
    match value.as_bool() {
        Some(b) => {
            *slot = b;
            true
        }
        None => false,
    }
}

fn set_flag(slot: &mut Option<bool>, value: &Value) -> bool {
    match value {
        Value::Bool(b) => {
            *slot = Some(*b);
            true
        }
        Value::Null => {
            *slot = None;
            true
        }
        _ => false,
    }
}

/// One configured step of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredAction")]
pub struct ActionInstance {
    pub id: String,
    #[serde(rename = "type")]
    pub action_type: String,
    pub variable_name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_window_action: bool,
    pub source: CaptureSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_position: Option<Position>,
    /// Field values keyed by the resolved schema's field keys
    #[serde(rename = "properties")]
    pub values: Map<String, Value>,
    pub policy: ExecutionPolicy,
    pub timestamp: DateTime<Utc>,
}

/// Wire form read back from documents. Older documents have no `policy`
/// and keep the execution settings among the properties.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAction {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type", default)]
    action_type: Option<String>,
    #[serde(default)]
    variable_name: Option<String>,
    #[serde(default)]
    is_window_action: bool,
    #[serde(default)]
    source: CaptureSource,
    #[serde(default)]
    element: Option<ElementDescriptor>,
    #[serde(default)]
    window: Option<WindowDescriptor>,
    #[serde(default)]
    click_position: Option<Position>,
    #[serde(default, alias = "values")]
    properties: Map<String, Value>,
    #[serde(default)]
    policy: Option<ExecutionPolicy>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

impl From<StoredAction> for ActionInstance {
    fn from(stored: StoredAction) -> Self {
        let action_type = stored
            .action_type
            .unwrap_or_else(|| if stored.is_window_action { "window" } else { "click" }.into());
        let id = stored.id.unwrap_or_else(new_action_id);
        let variable_name = stored
            .variable_name
            .unwrap_or_else(|| format!("{}_{}", action_type.to_lowercase(), short_id(&id)));
        let mut properties = stored.properties;
        // window bindings carry their own millisecond `timeout` field
        let policy = match stored.policy {
            Some(policy) => policy,
            None if stored.is_window_action => ExecutionPolicy::default(),
            None => ExecutionPolicy::take_from_properties(&mut properties),
        };

        Self {
            id,
            action_type,
            variable_name,
            is_window_action: stored.is_window_action,
            source: stored.source,
            element: stored.element,
            window: stored.window,
            click_position: stored.click_position,
            values: properties,
            policy,
            timestamp: stored.timestamp.unwrap_or_else(Utc::now),
        }
    }
}

impl ActionInstance {
    /// A blank action of `action_type` with the configured default policy
    pub fn new(
        action_type: impl Into<String>,
        variable_name: impl Into<String>,
        config: &RecorderConfig,
    ) -> Self {
        Self {
            id: new_action_id(),
            action_type: action_type.into(),
            variable_name: variable_name.into(),
            is_window_action: false,
            source: CaptureSource::Web,
            element: None,
            window: None,
            click_position: None,
            values: Map::new(),
            policy: ExecutionPolicy::from_config(config),
            timestamp: Utc::now(),
        }
    }

    /// Values as an editor sees them: stored values plus the text-entry
    /// flags kept on the policy.
    pub fn editor_values(&self) -> Map<String, Value> {
        let mut values = self.values.clone();
        if let Some(clear) = self.policy.clear_before {
            values.insert("clearBefore".into(), Value::Bool(clear));
        }
        if let Some(enter) = self.policy.send_enter {
            values.insert("sendEnter".into(), Value::Bool(enter));
        }
        values
    }

    /// Merges edited values. Text-entry flags and shared execution fields
    /// go to the policy unless `schema` declares a field of that name;
    /// `null` removes a value.
    pub fn apply_patch(&mut self, patch: Map<String, Value>, schema: &ResolvedSchema) {
        for (key, value) in patch {
            let policy_key = matches!(key.as_str(), "clearBefore" | "sendEnter")
                || schema.field(&key).is_none();
            if policy_key && self.policy.apply(&key, &value) {
                continue;
            }
            if value.is_null() {
                self.values.remove(&key);
            } else {
                self.values.insert(key, value);
            }
        }
    }

    /// Short human label, used by step projections and logs
    pub fn label(&self) -> String {
        if let Some(window) = &self.window {
            return window.display_name();
        }
        self.element
            .as_ref()
            .and_then(|e| {
                e.text
                    .clone()
                    .or_else(|| e.name.clone())
                    .or_else(|| e.locator().map(str::to_string))
            })
            .unwrap_or_else(|| self.action_type.clone())
    }
}

pub(crate) fn new_action_id() -> String {
    format!("action_{}", Uuid::new_v4().simple())
}

fn short_id(id: &str) -> String {
    id.chars()
        .rev()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(8)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<String>()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_routes_policy_keys() {
        let mut action = ActionInstance::new("type", "input_x", &RecorderConfig::default());
        action.policy.clear_before = Some(true);

        let patch = json!({"text": "hello", "clearBefore": false, "retryCount": 5, "selector": null});
        action.values.insert("selector".into(), json!("#a"));
        let schema = alqvimia_actions::ActionRegistry::builtin().resolve("type");
        action.apply_patch(patch.as_object().cloned().unwrap(), &schema);

        assert_eq!(action.values.get("text"), Some(&json!("hello")));
        assert!(action.values.get("selector").is_none());
        assert!(action.values.get("clearBefore").is_none());
        assert_eq!(action.policy.clear_before, Some(false));
        assert_eq!(action.policy.retry_count, 5);
        assert_eq!(action.editor_values()["clearBefore"], json!(false));
    }

    #[test]
    fn test_window_timeout_stays_a_value() {
        let mut action = ActionInstance::new("window", "window_x", &RecorderConfig::default());
        let schema = alqvimia_actions::ActionRegistry::builtin().resolve("window");
        let patch = json!({"timeout": 30000, "retryCount": 1});
        action.apply_patch(patch.as_object().cloned().unwrap(), &schema);
        assert_eq!(action.values["timeout"], 30000);
        assert_eq!(action.policy.timeout_seconds, 15);
        assert_eq!(action.policy.retry_count, 1);
    }

    #[test]
    fn test_legacy_properties_become_policy() {
        let action: ActionInstance = serde_json::from_value(json!({
            "id": "action_1700000000000",
            "type": "type",
            "variableName": "input_email_lx2",
            "properties": {
                "waitBefore": 0,
                "waitAfter": 800,
                "timeout": 20000,
                "retryCount": 2,
                "clearBefore": true,
                "text": "a@b.c"
            },
            "timestamp": "2024-03-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(action.policy.timeout_seconds, 20);
        assert_eq!(action.policy.post_delay_ms, 800);
        assert_eq!(action.policy.retry_count, 2);
        assert_eq!(action.policy.clear_before, Some(true));
        assert_eq!(action.values["text"], "a@b.c");
        assert!(action.values.get("waitAfter").is_none());
        assert!(action.values.get("timeout").is_none());
    }

    #[test]
    fn test_serialized_action_reads_back_equal() {
        let mut action = ActionInstance::new("select", "select_k3", &RecorderConfig::default());
        action.values.insert("selectBy".into(), json!("value"));
        let text = serde_json::to_string(&action).unwrap();
        assert!(text.contains("\"properties\""));
        let back: ActionInstance = serde_json::from_str(&text).unwrap();
        assert_eq!(back, action);
    }
}
