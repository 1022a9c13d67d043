use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Guide, GuideSource};

pub const LIBRARY_VERSION: &str = "1.0";

/// Denormalized per-guide entry so the library can be listed without
/// loading full documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideSummary {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub source: GuideSource,
    pub step_count: usize,
}

impl From<&Guide> for GuideSummary {
    fn from(guide: &Guide) -> Self {
        Self {
            id: guide.id.clone(),
            title: guide.title.clone(),
            created_at: guide.created_at,
            updated_at: guide.updated_at,
            source: guide.source,
            step_count: guide.steps.len(),
        }
    }
}

/// The single source of truth for listing; rebuilt incrementally on every
/// save and delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryIndex {
    pub version: String,
    pub guides: Vec<GuideSummary>,
    pub last_updated: DateTime<Utc>,
}

impl LibraryIndex {
    pub fn empty() -> Self {
        Self {
            version: LIBRARY_VERSION.to_string(),
            guides: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Insert-or-replace by guide id; re-saving never duplicates.
    pub fn upsert(&mut self, summary: GuideSummary) {
        match self.guides.iter_mut().find(|g| g.id == summary.id) {
            Some(existing) => *existing = summary,
            None => self.guides.push(summary),
        }
        self.last_updated = Utc::now();
    }

    pub fn remove(&mut self, guide_id: &str) {
        self.guides.retain(|g| g.id != guide_id);
        self.last_updated = Utc::now();
    }
}
