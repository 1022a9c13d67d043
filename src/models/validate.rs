use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{Error, Result, ValidationError};

use super::annotation::Annotation;
use super::guide::{Guide, SCHEMA_VERSION};
use super::step::Step;

/// Structural validation entry point for externally supplied documents
/// (import, recovery files). Returns the typed guide or the full list of
/// problems; never panics.
pub fn validate_guide(data: &serde_json::Value) -> std::result::Result<Guide, Vec<ValidationError>> {
    let guide: Guide = serde_json::from_value(data.clone())
        .map_err(|err| vec![ValidationError::new("", err.to_string())])?;

    let errors = check_guide(&guide);
    if errors.is_empty() {
        Ok(guide)
    } else {
        Err(errors)
    }
}

/// Checks the invariants the type system cannot express: uuid-formatted ids,
/// id uniqueness, the schema version literal, timestamp ordering, and
/// percentage-range annotation anchors.
pub fn check_guide(guide: &Guide) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_uuid(&guide.id, "id", &mut errors);

    if guide.schema_version != SCHEMA_VERSION {
        errors.push(ValidationError::new(
            "schemaVersion",
            format!(
                "expected \"{SCHEMA_VERSION}\", got \"{}\"",
                guide.schema_version
            ),
        ));
    }

    if guide.updated_at < guide.created_at {
        errors.push(ValidationError::new(
            "updatedAt",
            "updatedAt precedes createdAt",
        ));
    }

    let mut seen_ids = HashSet::new();
    for (index, step) in guide.steps.iter().enumerate() {
        if !seen_ids.insert(step.id.as_str()) {
            errors.push(ValidationError::new(
                format!("steps[{index}].id"),
                format!("duplicate step id {}", step.id),
            ));
        }
        check_step(step, index, &mut errors);
    }

    errors
}

/// Converts a freshly mutated guide into a result, so mutation helpers can
/// never hand back an invalid document.
pub(crate) fn ensure_valid(guide: Guide) -> Result<Guide> {
    let errors = check_guide(&guide);
    if errors.is_empty() {
        Ok(guide)
    } else {
        Err(Error::SchemaViolation(errors))
    }
}

fn check_step(step: &Step, index: usize, errors: &mut Vec<ValidationError>) {
    check_uuid(&step.id, &format!("steps[{index}].id"), errors);

    for (a_index, annotation) in step.annotations.iter().enumerate() {
        check_annotation(
            annotation,
            &format!("steps[{index}].annotations[{a_index}]"),
            errors,
        );
    }
}

fn check_annotation(annotation: &Annotation, path: &str, errors: &mut Vec<ValidationError>) {
    check_uuid(&annotation.id, &format!("{path}.id"), errors);

    if !(0.0..=100.0).contains(&annotation.x) {
        errors.push(ValidationError::new(
            format!("{path}.x"),
            format!("anchor {} outside percentage range 0-100", annotation.x),
        ));
    }
    if !(0.0..=100.0).contains(&annotation.y) {
        errors.push(ValidationError::new(
            format!("{path}.y"),
            format!("anchor {} outside percentage range 0-100", annotation.y),
        ));
    }
}

fn check_uuid(value: &str, path: &str, errors: &mut Vec<ValidationError>) {
    if Uuid::parse_str(value).is_err() {
        errors.push(ValidationError::new(path, format!("\"{value}\" is not a UUID")));
    }
}
