//! The saved form of a recording: actions plus the two projections derived
//! from them.

use crate::action::{ActionInstance, ExecutionPolicy};
use crate::events::{CaptureSource, ElementDescriptor, Position, Rect, WindowDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of the `variables` projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableEntry {
    pub name: String,
    /// `window` or `element`
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    /// The window or element descriptor behind the variable
    #[serde(default)]
    pub properties: Value,
}

impl VariableEntry {
    pub fn of(action: &ActionInstance) -> Self {
        let (kind, element_type, properties) = if action.is_window_action {
            (
                "window",
                action.window.as_ref().and_then(|w| w.process_name.clone()),
                serde_json::to_value(&action.window).unwrap_or_default(),
            )
        } else {
            (
                "element",
                action.element.as_ref().map(|e| e.tag_name.clone()),
                serde_json::to_value(&action.element).unwrap_or_default(),
            )
        };
        Self {
            name: action.variable_name.clone(),
            kind: kind.to_string(),
            element_type,
            properties,
        }
    }
}

/// Parameters of a studio step
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepParams {
    pub selector: String,
    pub xpath: String,
    pub automation_id: String,
    pub control_type: String,
    pub element_name: String,
    pub class_name: String,
    pub text: String,
    pub variable: String,
    pub wait_before: u64,
    pub wait_after: u64,
    /// Milliseconds
    pub timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
}

/// An action as the workflow studio shows it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub action: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub params: StepParams,
    #[serde(default)]
    pub source: CaptureSource,
    /// Full action some writers embed; used as-is when present
    #[serde(default, skip_serializing)]
    pub original_action: Option<Box<ActionInstance>>,
}

/// Font Awesome icon for an action type
pub fn action_icon(action_type: &str) -> &'static str {
    match action_type {
        "window" => "fa-window-maximize",
        "click" | "right" => "fa-mouse-pointer",
        "doubleClick" => "fa-hand-pointer",
        "type" | "input" => "fa-keyboard",
        "select" => "fa-list",
        "hover" => "fa-hand-paper",
        "scroll" => "fa-arrows-alt-v",
        "wait" => "fa-clock",
        "screenshot" => "fa-camera",
        _ => "fa-circle",
    }
}

/// Projects one action into the studio's step shape.
pub fn action_to_step(action: &ActionInstance) -> Step {
    let native = action.source == CaptureSource::Native;
    let element = action.element.clone().unwrap_or_default();
    let pick = |prefix: &str| {
        let name = element
            .name
            .clone()
            .or_else(|| element.text.clone())
            .or_else(|| element.id.clone())
            .unwrap_or_else(|| action.variable_name.clone());
        format!("{prefix}: {}", name.chars().take(30).collect::<String>())
    };
    let flavoured = |web: &str, ui: &str| if native { ui } else { web }.to_string();

    let (step_action, label) = if action.is_window_action {
        let title = action
            .window
            .as_ref()
            .and_then(|w| w.title.clone())
            .unwrap_or_else(|| action.variable_name.clone());
        ("window_focus".to_string(), format!("Focus window: {title}"))
    } else {
        match action.action_type.as_str() {
            "click" | "left" => (flavoured("web_click", "ui_click"), pick("Click")),
            "doubleClick" => (
                flavoured("web_double_click", "ui_double_click"),
                pick("Double click"),
            ),
            "type" | "input" => (flavoured("web_type", "ui_type"), pick("Type into")),
            "right" => (
                flavoured("web_right_click", "ui_right_click"),
                pick("Right click"),
            ),
            other => (other.to_string(), pick(other)),
        }
    };

    let timeout = if action.is_window_action {
        action
            .values
            .get("timeout")
            .and_then(Value::as_u64)
            .unwrap_or(action.policy.timeout_seconds * 1000)
    } else {
        action.policy.timeout_seconds * 1000
    };

    Step {
        id: action.id.clone(),
        icon: action_icon(if action.is_window_action {
            "window"
        } else {
            action.action_type.as_str()
        })
        .to_string(),
        action: step_action,
        label,
        params: StepParams {
            selector: element.selector.clone().unwrap_or_default(),
            xpath: element.xpath.clone().unwrap_or_default(),
            automation_id: element.automation_id.clone().unwrap_or_default(),
            control_type: element.control_type.clone().unwrap_or_default(),
            element_name: element.name.clone().unwrap_or_default(),
            class_name: element.class_name.clone().unwrap_or_default(),
            text: element.text.clone().unwrap_or_default(),
            variable: action.variable_name.clone(),
            wait_before: action.policy.pre_delay_ms,
            wait_after: action.policy.post_delay_ms,
            timeout,
            click_position: action.click_position,
            bounds: element.bounds,
        },
        source: action.source,
        original_action: None,
    }
}

/// Rebuilds an action from a studio step, for documents that carry no
/// `actions`.
pub fn step_to_action(step: &Step) -> ActionInstance {
    if let Some(original) = &step.original_action {
        return (**original).clone();
    }

    let action = step.action.as_str();
    let (action_type, is_window_action) = if action.contains("window") {
        ("window".to_string(), true)
    } else if action.contains("double") {
        ("doubleClick".to_string(), false)
    } else if action.contains("type") {
        ("type".to_string(), false)
    } else if action.contains("right") {
        ("right".to_string(), false)
    } else if action.contains("click") || action.is_empty() {
        ("click".to_string(), false)
    } else {
        (action.to_string(), false)
    };
    let source = if action.contains("ui_") || action.contains("native") {
        CaptureSource::Native
    } else {
        step.source
    };

    let params = &step.params;
    let text = |s: &String| (!s.is_empty()).then(|| s.clone());

    let mut policy = ExecutionPolicy {
        pre_delay_ms: params.wait_before,
        post_delay_ms: params.wait_after,
        ..ExecutionPolicy::default()
    };
    if params.timeout > 0 {
        policy.timeout_seconds = (params.timeout / 1000).max(1);
    }

    let mut values = Map::new();
    let (element, window) = if is_window_action {
        values.insert("timeout".into(), Value::from(params.timeout.max(1000)));
        let window = WindowDescriptor {
            title: step
                .label
                .split_once(": ")
                .map(|(_, title)| title.to_string()),
            ..Default::default()
        };
        (None, Some(window))
    } else {
        let element = ElementDescriptor {
            tag_name: text(&params.control_type).unwrap_or_else(|| "element".to_string()),
            control_type: text(&params.control_type),
            id: text(&params.automation_id),
            automation_id: text(&params.automation_id),
            class_name: text(&params.class_name),
            name: text(&params.element_name),
            selector: text(&params.selector),
            xpath: text(&params.xpath),
            text: text(&params.text),
            bounds: params.bounds,
            ..Default::default()
        };
        if let Some(locator) = element.locator() {
            values.insert("selector".into(), Value::from(locator));
        }
        (Some(element), None)
    };

    let variable_name = text(&params.variable).unwrap_or_else(|| {
        let suffix: String = step.id.chars().filter(char::is_ascii_alphanumeric).collect();
        format!("element_{suffix}")
    });

    ActionInstance {
        id: step.id.clone(),
        variable_name,
        action_type,
        is_window_action,
        source,
        element,
        window,
        click_position: params.click_position,
        values,
        policy,
        timestamp: Utc::now(),
    }
}

/// A saved workflow (`jsonForm`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_window: Option<WindowDescriptor>,
    #[serde(default)]
    pub window_variable: String,
    /// Derived from `actions`
    #[serde(default)]
    pub variables: Vec<VariableEntry>,
    /// Derived from `actions`
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub actions: Vec<ActionInstance>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WorkflowDocument {
    /// Builds a document with fresh projections. An empty `id` gets a new
    /// `wf_<millis>` id.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        target_window: Option<WindowDescriptor>,
        window_variable: impl Into<String>,
        actions: Vec<ActionInstance>,
    ) -> Self {
        let now = Utc::now();
        let mut id = id.into();
        if id.is_empty() {
            id = new_workflow_id(now);
        }
        let mut document = Self {
            id,
            name: name.into(),
            description: description.into(),
            target_window,
            window_variable: window_variable.into(),
            variables: Vec::new(),
            steps: Vec::new(),
            actions,
            created_at: now,
            updated_at: Some(now),
        };
        document.refresh_projections();
        document
    }

    /// Regenerates `variables` and `steps` from `actions`.
    ///
    /// Studio documents carry only `steps`; those are kept and `variables`
    /// is rebuilt from the actions they map back to.
    pub fn refresh_projections(&mut self) {
        if self.actions.is_empty() && !self.steps.is_empty() {
            self.variables = self
                .steps
                .iter()
                .map(|step| VariableEntry::of(&step_to_action(step)))
                .collect();
            return;
        }
        self.variables = self.actions.iter().map(VariableEntry::of).collect();
        self.steps = self.actions.iter().map(action_to_step).collect();
    }

    fn with_fresh_projections(&self) -> Self {
        let mut document = self.clone();
        document.refresh_projections();
        document
    }

    /// The stored actions, or actions rebuilt from `steps` for documents
    /// written by the workflow studio.
    pub fn recorded_actions(&self) -> Vec<ActionInstance> {
        if !self.actions.is_empty() || self.steps.is_empty() {
            return self.actions.clone();
        }
        self.steps.iter().map(step_to_action).collect()
    }

    /// `<name>.wfl` with everything outside `[A-Za-z0-9]` replaced by `_`
    pub fn export_file_name(&self) -> String {
        export_file_name(&self.name)
    }

    /// Pretty JSON with `variables` and `steps` regenerated from `actions`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.with_fresh_projections())
    }

    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self.with_fresh_projections())
    }
}

pub fn export_file_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}.wfl")
}

pub(crate) fn new_workflow_id(now: DateTime<Utc>) -> String {
    format!("wf_{}", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecorderConfig;
    use serde_json::json;

    fn native_click() -> ActionInstance {
        let mut action = ActionInstance::new("click", "button_k1", &RecorderConfig::default());
        action.source = CaptureSource::Native;
        action.element = Some(ElementDescriptor {
            tag_name: "Button".into(),
            control_type: Some("Button".into()),
            automation_id: Some("btnOk".into()),
            name: Some("OK".into()),
            ..Default::default()
        });
        action
    }

    #[test]
    fn test_step_mapping() {
        let step = action_to_step(&native_click());
        assert_eq!(step.action, "ui_click");
        assert_eq!(step.icon, "fa-mouse-pointer");
        assert_eq!(step.label, "Click: OK");
        assert_eq!(step.params.automation_id, "btnOk");
        assert_eq!(step.params.timeout, 15000);
        assert_eq!(step.params.wait_after, 500);

        let mut typed = native_click();
        typed.action_type = "input".into();
        typed.source = CaptureSource::Web;
        assert_eq!(action_to_step(&typed).action, "web_type");
        assert_eq!(action_to_step(&typed).icon, "fa-keyboard");
    }

    #[test]
    fn test_step_back_to_action() {
        let step: Step = serde_json::from_value(json!({
            "id": "s1",
            "action": "ui_double_click",
            "params": {
                "automationId": "grid",
                "controlType": "DataItem",
                "variable": "row_1",
                "timeout": 30000
            }
        }))
        .unwrap();
        let action = step_to_action(&step);
        assert_eq!(action.action_type, "doubleClick");
        assert_eq!(action.source, CaptureSource::Native);
        assert_eq!(action.variable_name, "row_1");
        assert_eq!(action.policy.timeout_seconds, 30);
        assert_eq!(action.values["selector"], "grid");

        let window: Step = serde_json::from_value(json!({
            "id": "w",
            "action": "window_focus",
            "label": "Focus window: Inbox"
        }))
        .unwrap();
        let action = step_to_action(&window);
        assert!(action.is_window_action);
        assert_eq!(action.window.unwrap().title.as_deref(), Some("Inbox"));
    }

    #[test]
    fn test_projections_follow_actions() {
        let mut document =
            WorkflowDocument::new("", "Pay run", "", None, "window_erp", vec![native_click()]);
        assert!(document.id.starts_with("wf_"));
        assert_eq!(document.variables[0].kind, "element");
        assert_eq!(document.variables[0].element_type.as_deref(), Some("Button"));

        document.actions[0].variable_name = "ok_button".into();
        document.refresh_projections();
        assert_eq!(document.variables[0].name, "ok_button");
        assert_eq!(document.steps[0].params.variable, "ok_button");
    }

    #[test]
    fn test_serialized_projections_never_drift() {
        let mut document = WorkflowDocument::new(
            "",
            "Pay run",
            "",
            None,
            "window_erp",
            vec![native_click(), native_click()],
        );
        document.actions.pop();
        document.variables.clear();

        let value = document.to_value().unwrap();
        assert_eq!(value["variables"].as_array().unwrap().len(), 1);
        assert_eq!(value["steps"].as_array().unwrap().len(), 1);
        assert_eq!(document.variables.len(), 0);
    }

    #[test]
    fn test_studio_steps_survive_refresh() {
        let step = action_to_step(&native_click());
        let mut document = WorkflowDocument::new("", "Studio", "", None, "", Vec::new());
        document.steps = vec![step.clone()];
        document.refresh_projections();
        assert_eq!(document.steps, vec![step]);
        assert_eq!(document.variables.len(), 1);
        assert!(document.actions.is_empty());
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Login & Export (v2)"), "Login___Export__v2_.wfl");
    }
}
