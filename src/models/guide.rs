use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::step::{CaptureSource, Step};

pub const SCHEMA_VERSION: &str = "1.0";

/// Where a guide's steps were captured from. Flips to `Mixed` permanently
/// once a step from a different surface is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideSource {
    Chrome,
    Desktop,
    Mixed,
}

impl GuideSource {
    /// Whether a step from `source` matches this guide source exactly.
    pub fn matches(&self, source: CaptureSource) -> bool {
        matches!(
            (self, source),
            (GuideSource::Chrome, CaptureSource::Chrome)
                | (GuideSource::Desktop, CaptureSource::Desktop)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// The versioned workflow document: an ordered sequence of recorded steps
/// plus descriptive metadata. Step order is canonical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    pub id: String,
    pub schema_version: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub source: GuideSource,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub metadata: GuideMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<String>,
}
