use crate::error::{RecorderError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Represents a rectangle in screen or page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    #[serde(default, alias = "left")]
    pub x: f64,
    #[serde(default, alias = "top")]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Represents a position on the screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Where an element was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    /// A page inside the browser extension
    #[default]
    Web,
    /// A desktop control captured through UI Automation
    Native,
}

/// Category of a target window as reported by the capture backend
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WindowKind {
    Browser,
    Editor,
    Explorer,
    Terminal,
    System,
    /// An existing workflow variable chosen in place of a live window
    Variable,
    #[default]
    Application,
    /// A category this crate does not know, kept as reported
    Other(String),
}

impl WindowKind {
    pub fn as_str(&self) -> &str {
        match self {
            WindowKind::Browser => "browser",
            WindowKind::Editor => "editor",
            WindowKind::Explorer => "explorer",
            WindowKind::Terminal => "terminal",
            WindowKind::System => "system",
            WindowKind::Variable => "variable",
            WindowKind::Application => "application",
            WindowKind::Other(kind) => kind,
        }
    }
}

impl From<String> for WindowKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "browser" => WindowKind::Browser,
            "editor" => WindowKind::Editor,
            "explorer" => WindowKind::Explorer,
            "terminal" => WindowKind::Terminal,
            "system" => WindowKind::System,
            "variable" => WindowKind::Variable,
            "application" | "" => WindowKind::Application,
            _ => WindowKind::Other(kind),
        }
    }
}

impl From<WindowKind> for String {
    fn from(kind: WindowKind) -> Self {
        match kind {
            WindowKind::Other(kind) => kind,
            known => known.as_str().to_string(),
        }
    }
}

/// A window or browser tab the session can bind to
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: WindowKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_type: Option<String>,
    /// Set when an existing variable is used as the window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_name: Option<String>,
    /// Anything else the backend reported
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WindowDescriptor {
    /// A live window identified by title and process
    pub fn new(title: impl Into<String>, process_name: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            process_name: Some(process_name.into()),
            ..Default::default()
        }
    }

    /// Use an existing workflow variable as the target window
    pub fn from_variable(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: Some(Value::String(name.clone())),
            title: Some(name.clone()),
            kind: WindowKind::Variable,
            variable_name: Some(name),
            ..Default::default()
        }
    }

    /// `id` rendered as text, whether the backend sent a string or a number
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn display_name(&self) -> String {
        self.title
            .clone()
            .or_else(|| self.process_name.clone())
            .or_else(|| self.id_string())
            .unwrap_or_else(|| "window".to_string())
    }

    fn validate(&self) -> Result<()> {
        let has_identity = non_empty(&self.title)
            || non_empty(&self.process_name)
            || self.id_string().is_some()
            || self.handle.as_ref().is_some_and(|h| !h.is_null());
        if has_identity {
            Ok(())
        } else {
            Err(RecorderError::MalformedCaptureEvent(
                "window-selected carries no title, process name, id or handle".to_string(),
            ))
        }
    }
}

/// Element payload as pushed by the capture backend.
///
/// Browser and UI Automation captures use overlapping but different keys, so
/// nearly everything is optional. Keys not listed here land in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCapture {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    /// `type` attribute of the element (e.g. `text` for an input)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_interactive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<CaptureSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawCapture {
    /// Tag-like name of the element: `tagName`, then `type`, then `controlType`
    pub fn tag(&self) -> Option<&str> {
        [&self.tag_name, &self.element_type, &self.control_type]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }

    /// Something that lets the element be found again at replay time
    pub fn has_locator(&self) -> bool {
        non_empty(&self.selector)
            || non_empty(&self.xpath)
            || non_empty(&self.automation_id)
            || non_empty(&self.id)
            || non_empty(&self.name)
            || self.rect.is_some()
            || self.bounds.is_some()
            || (self.x.is_some() && self.y.is_some())
    }

    fn attribute_str(&self, key: &str) -> Option<String> {
        self.attributes
            .as_ref()?
            .get(key)?
            .as_str()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    fn attribute_bool(&self, key: &str) -> Option<bool> {
        self.attributes.as_ref()?.get(key)?.as_bool()
    }

    fn validate(&self) -> Result<()> {
        if self.tag().is_none() {
            return Err(RecorderError::MalformedCaptureEvent(
                "element-captured has no tagName, type or controlType".to_string(),
            ));
        }
        if !self.has_locator() {
            return Err(RecorderError::MalformedCaptureEvent(
                "element-captured has no selector, xpath, id or geometry".to_string(),
            ));
        }
        Ok(())
    }
}

/// The captured element as stored on an action
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDescriptor {
    #[serde(default)]
    pub tag_name: String,
    /// `type` attribute as captured (e.g. `password`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    /// Display text, truncated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    /// Page geometry; the other of `rect`/`bounds` when only one was captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_interactive: Option<bool>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
    /// Captured keys with no dedicated field, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ElementDescriptor {
    /// Builds the stored element from a capture, truncating the display text
    /// to `max_text_len` characters.
    pub fn from_capture(raw: &RawCapture, max_text_len: usize) -> Self {
        let display = [&raw.name, &raw.text, &raw.value, &raw.id]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .map(|s| s.chars().take(max_text_len).collect::<String>());

        Self {
            tag_name: raw.tag().unwrap_or_default().to_string(),
            element_type: clean(&raw.element_type),
            control_type: clean(&raw.control_type).or_else(|| raw.attribute_str("controlType")),
            id: clean(&raw.id).or_else(|| clean(&raw.automation_id)),
            automation_id: clean(&raw.automation_id)
                .or_else(|| raw.attribute_str("automationId")),
            class_name: clean(&raw.class_name),
            name: clean(&raw.name),
            selector: clean(&raw.selector),
            xpath: clean(&raw.xpath),
            text: display,
            value: clean(&raw.value),
            placeholder: clean(&raw.placeholder),
            href: clean(&raw.href),
            src: clean(&raw.src),
            rect: raw.rect.or(raw.bounds),
            bounds: raw.bounds.or(raw.rect),
            is_enabled: raw.is_enabled.or_else(|| raw.attribute_bool("isEnabled")),
            is_interactive: raw
                .is_interactive
                .or_else(|| raw.attribute_bool("isInteractive")),
            attributes: raw.attributes.clone().unwrap_or_default(),
            extra: raw.extra.clone(),
        }
    }

    /// Best locator for replay: selector, then xpath, then automation id
    pub fn locator(&self) -> Option<&str> {
        self.selector
            .as_deref()
            .or(self.xpath.as_deref())
            .or(self.automation_id.as_deref())
    }
}

/// Events pushed by the capture backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum CaptureEvent {
    /// The user picked a target window
    WindowSelected(WindowDescriptor),

    /// An element was captured in the target window
    ElementCaptured(RawCapture),

    /// The backend ended the capture on its own (window closed, extension gone)
    SessionStopped {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl CaptureEvent {
    /// Parses and checks an event. Events missing required fields are
    /// rejected whole rather than turned into partial actions.
    pub fn from_value(value: Value) -> Result<Self> {
        let event: CaptureEvent = serde_json::from_value(value)
            .map_err(|e| RecorderError::MalformedCaptureEvent(e.to_string()))?;
        event.validate()?;
        Ok(event)
    }

    pub fn from_json(line: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(line)
            .map_err(|e| RecorderError::MalformedCaptureEvent(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            CaptureEvent::WindowSelected(window) => window.validate(),
            CaptureEvent::ElementCaptured(raw) => raw.validate(),
            CaptureEvent::SessionStopped { .. } => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CaptureEvent::WindowSelected(_) => "window-selected",
            CaptureEvent::ElementCaptured(_) => "element-captured",
            CaptureEvent::SessionStopped { .. } => "session-stopped",
        }
    }
}

fn non_empty(s: &Option<String>) -> bool {
    s.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn clean(s: &Option<String>) -> Option<String> {
    s.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}
