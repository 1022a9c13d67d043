use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::annotation::Annotation;

/// The kind of user action a step records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionType {
    Click,
    DoubleClick,
    RightClick,
    Input,
    Navigate,
    Scroll,
    Key,
    Select,
    Hover,
    Drag,
    Paste,
    Custom,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Click => "click",
            ActionType::DoubleClick => "doubleClick",
            ActionType::RightClick => "rightClick",
            ActionType::Input => "input",
            ActionType::Navigate => "navigate",
            ActionType::Scroll => "scroll",
            ActionType::Key => "key",
            ActionType::Select => "select",
            ActionType::Hover => "hover",
            ActionType::Drag => "drag",
            ActionType::Paste => "paste",
            ActionType::Custom => "custom",
        }
    }
}

/// Which capture surface produced a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    Chrome,
    Desktop,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// Everything we know about the element or window a step acted on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// A step's screenshot is either the raw payload carried in memory or a
/// reference to an extracted file inside the guide bundle. The two forms are
/// mutually exclusive; the store converts between them on save and load.
#[derive(Debug, Clone, PartialEq)]
pub enum Screenshot {
    Inline { base64: String, mime: String },
    OnDisk { path: String, mime: String },
}

impl Screenshot {
    pub fn png_inline(base64: impl Into<String>) -> Self {
        Screenshot::Inline {
            base64: base64.into(),
            mime: "image/png".to_string(),
        }
    }

    pub fn mime(&self) -> &str {
        match self {
            Screenshot::Inline { mime, .. } | Screenshot::OnDisk { mime, .. } => mime,
        }
    }

    /// File extension used when the payload is extracted to disk.
    pub fn file_extension(&self) -> &'static str {
        if self.mime() == "image/jpeg" {
            "jpg"
        } else {
            "png"
        }
    }
}

/// One recorded user action inside a guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StepWire", into = "StepWire")]
pub struct Step {
    pub id: String,
    pub title: String,
    pub description: String,
    pub action_type: ActionType,
    pub timestamp: DateTime<Utc>,
    pub source: CaptureSource,
    pub target: Option<TargetMetadata>,
    pub input_value: Option<String>,
    pub input_masked: bool,
    pub screenshot: Option<Screenshot>,
    pub annotations: Vec<Annotation>,
    pub ai_summary: Option<String>,
    pub ai_description: Option<String>,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Wire shape of a step. Screenshots are flattened to the historical
/// `screenshotBase64` / `screenshotPath` field pair here; `TryFrom` rejects
/// documents that carry both at once.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepWire {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    action_type: ActionType,
    timestamp: DateTime<Utc>,
    source: CaptureSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<TargetMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_value: Option<String>,
    #[serde(default)]
    input_masked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    screenshot_base64: Option<String>,
    #[serde(default = "default_mime")]
    screenshot_mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    screenshot_path: Option<String>,
    #[serde(default)]
    annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ai_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ai_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

fn default_mime() -> String {
    "image/png".to_string()
}

impl TryFrom<StepWire> for Step {
    type Error = String;

    fn try_from(wire: StepWire) -> Result<Self, Self::Error> {
        let screenshot = match (wire.screenshot_base64, wire.screenshot_path) {
            (Some(_), Some(_)) => {
                return Err(format!(
                    "step {}: screenshotBase64 and screenshotPath are mutually exclusive",
                    wire.id
                ));
            }
            (Some(base64), None) => Some(Screenshot::Inline {
                base64,
                mime: wire.screenshot_mime_type,
            }),
            (None, Some(path)) => Some(Screenshot::OnDisk {
                path,
                mime: wire.screenshot_mime_type,
            }),
            (None, None) => None,
        };

        Ok(Step {
            id: wire.id,
            title: wire.title,
            description: wire.description,
            action_type: wire.action_type,
            timestamp: wire.timestamp,
            source: wire.source,
            target: wire.target,
            input_value: wire.input_value,
            input_masked: wire.input_masked,
            screenshot,
            annotations: wire.annotations,
            ai_summary: wire.ai_summary,
            ai_description: wire.ai_description,
            metadata: wire.metadata,
        })
    }
}

impl From<Step> for StepWire {
    fn from(step: Step) -> Self {
        let (screenshot_base64, screenshot_path, screenshot_mime_type) = match step.screenshot {
            Some(Screenshot::Inline { base64, mime }) => (Some(base64), None, mime),
            Some(Screenshot::OnDisk { path, mime }) => (None, Some(path), mime),
            None => (None, None, default_mime()),
        };

        StepWire {
            id: step.id,
            title: step.title,
            description: step.description,
            action_type: step.action_type,
            timestamp: step.timestamp,
            source: step.source,
            target: step.target,
            input_value: step.input_value,
            input_masked: step.input_masked,
            screenshot_base64,
            screenshot_mime_type,
            screenshot_path,
            annotations: step.annotations,
            ai_summary: step.ai_summary,
            ai_description: step.ai_description,
            metadata: step.metadata,
        }
    }
}
