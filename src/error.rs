use std::fmt;

use thiserror::Error;

/// A single structural problem found while validating a document, with the
/// field path it was found at (e.g. `steps[2].annotations[0].x`).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("document failed schema validation: {}", format_validation_errors(.0))]
    SchemaViolation(Vec<ValidationError>),

    #[error("guide not found: {guide_id}")]
    NotFound { guide_id: String },

    #[error("index {index} out of range for {len} steps")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unreadable recovery session: {path}")]
    MalformedSession { path: String },
}

pub type Result<T> = std::result::Result<T, Error>;

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
