use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{ActionType, Coordinates, TargetMetadata};

/// The element a raw event landed on, as reported by the event source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTarget {
    #[serde(default)]
    pub selector: String,
    #[serde(default)]
    pub xpath: String,
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
    pub coordinates: Option<Coordinates>,
}

/// One raw interaction delivered by the event source, before grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedEvent {
    #[serde(rename = "type")]
    pub kind: ActionType,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub url: String,
    pub target: EventTarget,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_value: Option<String>,
}

impl CapturedEvent {
    /// Step-facing view of the event target; the event's page URL rides
    /// along so exported steps stay self-describing.
    pub fn target_metadata(&self) -> TargetMetadata {
        let target = &self.target;
        TargetMetadata {
            selector: non_empty(&target.selector),
            xpath: non_empty(&target.xpath),
            element_text: target.element_text.clone(),
            element_role: target.element_role.clone(),
            element_label: target.element_label.clone(),
            placeholder: target.placeholder.clone(),
            input_name: target.input_name.clone(),
            input_id: target.input_id.clone(),
            input_type: target.input_type.clone(),
            url: non_empty(&self.url),
            window_title: None,
            process_name: None,
            coordinates: target.coordinates,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
