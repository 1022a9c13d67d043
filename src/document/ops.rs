//! Pure mutation operations over guide documents.
//!
//! Every operation takes the current guide by reference and returns a fresh
//! value; inputs are never mutated. Each mutation re-validates the result
//! before returning, so a helper can never hand back an invalid document.

use chrono::Utc;
use uuid::Uuid;

use crate::error::{Error, Result, ValidationError};
use crate::models::validate::ensure_valid;
use crate::models::{
    ActionType, Annotation, AnnotationType, CaptureSource, Guide, GuideMetadata, GuideSource,
    Screenshot, Step, TargetMetadata, SCHEMA_VERSION,
};

pub fn create_guide(title: impl Into<String>, source: GuideSource) -> Guide {
    let now = Utc::now();
    Guide {
        id: Uuid::new_v4().to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        title: title.into(),
        description: String::new(),
        created_at: now,
        updated_at: now,
        source,
        steps: Vec::new(),
        metadata: GuideMetadata::default(),
        ai_summary: None,
    }
}

pub fn create_step(action_type: ActionType, source: CaptureSource) -> Step {
    Step {
        id: Uuid::new_v4().to_string(),
        title: String::new(),
        description: String::new(),
        action_type,
        timestamp: Utc::now(),
        source,
        target: None,
        input_value: None,
        input_masked: false,
        screenshot: None,
        annotations: Vec::new(),
        ai_summary: None,
        ai_description: None,
        metadata: None,
    }
}

pub fn create_annotation(kind: AnnotationType, x: f64, y: f64) -> Annotation {
    Annotation {
        id: Uuid::new_v4().to_string(),
        kind,
        x,
        y,
        width: None,
        height: None,
        end_x: None,
        end_y: None,
        points: None,
        color: "#FF0000".to_string(),
        stroke_width: 2.0,
        text: None,
        font_size: None,
    }
}

/// Appends a step at the end of the guide. A step captured from a different
/// surface than the guide's current source flips the source to `Mixed`.
pub fn add_step_to_guide(guide: &Guide, step: Step) -> Result<Guide> {
    let mut updated = guide.clone();

    if updated.source != GuideSource::Mixed && !updated.source.matches(step.source) {
        updated.source = GuideSource::Mixed;
    }

    updated.steps.push(step);
    updated.updated_at = Utc::now();
    ensure_valid(updated)
}

/// Field replacements applied by [`update_step`]. `None` leaves a field
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct StepPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target: Option<TargetMetadata>,
    pub input_value: Option<String>,
    pub input_masked: Option<bool>,
    pub screenshot: Option<Screenshot>,
    pub annotations: Option<Vec<Annotation>>,
    pub ai_summary: Option<String>,
    pub ai_description: Option<String>,
}

/// Replaces fields on the matching step. An unknown step id is a silent
/// no-op (only `updatedAt` advances); callers that care check beforehand.
pub fn update_step(guide: &Guide, step_id: &str, patch: StepPatch) -> Result<Guide> {
    let mut updated = guide.clone();

    if let Some(step) = updated.steps.iter_mut().find(|s| s.id == step_id) {
        if let Some(title) = patch.title {
            step.title = title;
        }
        if let Some(description) = patch.description {
            step.description = description;
        }
        if let Some(target) = patch.target {
            step.target = Some(target);
        }
        if let Some(input_value) = patch.input_value {
            step.input_value = Some(input_value);
        }
        if let Some(input_masked) = patch.input_masked {
            step.input_masked = input_masked;
        }
        if let Some(screenshot) = patch.screenshot {
            step.screenshot = Some(screenshot);
        }
        if let Some(annotations) = patch.annotations {
            step.annotations = annotations;
        }
        if let Some(ai_summary) = patch.ai_summary {
            step.ai_summary = Some(ai_summary);
        }
        if let Some(ai_description) = patch.ai_description {
            step.ai_description = Some(ai_description);
        }
    }

    updated.updated_at = Utc::now();
    ensure_valid(updated)
}

pub fn delete_step(guide: &Guide, step_id: &str) -> Result<Guide> {
    let mut updated = guide.clone();
    updated.steps.retain(|s| s.id != step_id);
    updated.updated_at = Utc::now();
    ensure_valid(updated)
}

/// Moves the step at `from_index` to `to_index`, shifting the steps in
/// between. `from_index == to_index` is a tolerated no-op; out-of-range
/// indices fail loudly rather than silently corrupting the order.
pub fn reorder_steps(guide: &Guide, from_index: usize, to_index: usize) -> Result<Guide> {
    let len = guide.steps.len();
    if from_index >= len {
        return Err(Error::IndexOutOfRange {
            index: from_index,
            len,
        });
    }
    if to_index >= len {
        return Err(Error::IndexOutOfRange {
            index: to_index,
            len,
        });
    }

    let mut updated = guide.clone();
    if from_index != to_index {
        let step = updated.steps.remove(from_index);
        updated.steps.insert(to_index, step);
    }
    updated.updated_at = Utc::now();
    ensure_valid(updated)
}

pub fn add_annotation_to_step(guide: &Guide, step_id: &str, annotation: Annotation) -> Result<Guide> {
    let mut annotations = match guide.steps.iter().find(|s| s.id == step_id) {
        Some(step) => step.annotations.clone(),
        None => return update_step(guide, step_id, StepPatch::default()),
    };
    annotations.push(annotation);

    update_step(
        guide,
        step_id,
        StepPatch {
            annotations: Some(annotations),
            ..StepPatch::default()
        },
    )
}

pub fn remove_annotation_from_step(
    guide: &Guide,
    step_id: &str,
    annotation_id: &str,
) -> Result<Guide> {
    let annotations = match guide.steps.iter().find(|s| s.id == step_id) {
        Some(step) => step
            .annotations
            .iter()
            .filter(|a| a.id != annotation_id)
            .cloned()
            .collect(),
        None => return Ok(guide.clone()),
    };

    update_step(
        guide,
        step_id,
        StepPatch {
            annotations: Some(annotations),
            ..StepPatch::default()
        },
    )
}

pub fn update_step_screenshot(guide: &Guide, step_id: &str, screenshot: Screenshot) -> Result<Guide> {
    update_step(
        guide,
        step_id,
        StepPatch {
            screenshot: Some(screenshot),
            ..StepPatch::default()
        },
    )
}

/// Canonical lossless text form of a guide.
pub fn serialize_guide(guide: &Guide) -> Result<String> {
    Ok(serde_json::to_string_pretty(guide)?)
}

/// Parses and re-validates a serialized guide. Malformed input is a schema
/// violation, never a panic.
pub fn deserialize_guide(json: &str) -> Result<Guide> {
    let guide: Guide = serde_json::from_str(json)
        .map_err(|err| Error::SchemaViolation(vec![ValidationError::new("", err.to_string())]))?;
    ensure_valid(guide)
}
