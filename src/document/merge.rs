//! Collapsing several recorded steps into one.

use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;
use crate::models::validate::ensure_valid;
use crate::models::{Guide, Step};

/// Which merged step's screenshot the combined step keeps. `First` and
/// `Last` scan the steps in the order the caller supplied their ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenshotStrategy {
    First,
    Last,
    None,
}

#[derive(Debug, Clone)]
pub struct MergeOptions {
    pub screenshot_strategy: ScreenshotStrategy,
    /// Join all descriptions with blank lines, or keep only the first.
    pub combine_descriptions: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            screenshot_strategy: ScreenshotStrategy::First,
            combine_descriptions: true,
        }
    }
}

/// Merges the steps named by `step_ids` into a single step.
///
/// The merged step is inserted where the first matching step sat in the
/// document, regardless of the order ids were supplied in. Supplied order
/// does drive content: title and description concatenation, annotation
/// order, and the screenshot scan. Fewer than two resolved ids returns the
/// guide unchanged. Unknown ids are skipped.
pub fn merge_steps(guide: &Guide, step_ids: &[String], options: &MergeOptions) -> Result<Guide> {
    // Fewer than two distinct document steps match the id set: no-op. The
    // threshold counts matching steps, not supplied ids, so a repeated id
    // cannot merge a step with itself.
    let matching = guide
        .steps
        .iter()
        .filter(|s| step_ids.contains(&s.id))
        .count();
    if matching < 2 {
        return Ok(guide.clone());
    }

    let resolved: Vec<&Step> = step_ids
        .iter()
        .filter_map(|id| guide.steps.iter().find(|s| &s.id == id))
        .collect();

    let first_index = guide
        .steps
        .iter()
        .position(|s| step_ids.contains(&s.id))
        .unwrap_or(0);

    let screenshot = match options.screenshot_strategy {
        ScreenshotStrategy::First => resolved.iter().find_map(|s| s.screenshot.clone()),
        ScreenshotStrategy::Last => resolved.iter().rev().find_map(|s| s.screenshot.clone()),
        ScreenshotStrategy::None => None,
    };
    let title = {
        let joined = resolved
            .iter()
            .map(|s| s.title.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" → ");
        if joined.is_empty() {
            "Merged Step".to_string()
        } else {
            joined
        }
    };

    let description = if options.combine_descriptions {
        resolved
            .iter()
            .map(|s| s.description.as_str())
            .filter(|d| !d.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    } else {
        resolved[0].description.clone()
    };

    let merged = Step {
        id: Uuid::new_v4().to_string(),
        title,
        description,
        action_type: resolved[0].action_type,
        timestamp: resolved[0].timestamp,
        source: resolved[0].source,
        target: resolved[0].target.clone(),
        input_value: None,
        input_masked: false,
        screenshot,
        annotations: resolved
            .iter()
            .flat_map(|s| s.annotations.iter().cloned())
            .collect(),
        ai_summary: None,
        ai_description: None,
        metadata: None,
    };

    let mut updated = guide.clone();
    updated.steps.retain(|s| !step_ids.contains(&s.id));
    updated.steps.insert(first_index, merged);
    updated.updated_at = Utc::now();
    ensure_valid(updated)
}
