//! Turning one grouped raw event into a step.

use chrono::Utc;
use url::Url;
use uuid::Uuid;

use crate::models::{ActionType, CaptureSource, Screenshot, Step};

use super::events::CapturedEvent;

/// Mask placeholder written instead of a sensitive input value. Fixed
/// length, so the replacement does not leak how much was typed.
pub const MASK_PLACEHOLDER: &str = "••••••••";

const TITLE_TEXT_CLIP: usize = 30;

/// Knobs for step synthesis during a capture session.
#[derive(Debug, Clone)]
pub struct CaptureOptions {
    /// Which surface the session records from; stamped onto every step.
    pub source: CaptureSource,
    /// Mask every input value, not just password fields.
    pub mask_input: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            source: CaptureSource::Chrome,
            mask_input: false,
        }
    }
}

/// Converts a grouped event plus an optional screenshot into a step.
/// Title synthesis is heuristic and best-effort; this never fails.
pub fn synthesize_step(
    event: &CapturedEvent,
    screenshot: Option<Screenshot>,
    options: &CaptureOptions,
) -> Step {
    let title = synthesize_title(event);

    let is_password = event.target.input_type.as_deref() == Some("password");
    let mask = options.mask_input || is_password;
    let (input_value, input_masked) = match &event.input_value {
        Some(_) if mask => (Some(MASK_PLACEHOLDER.to_string()), true),
        Some(value) => (Some(value.clone()), false),
        None => (None, false),
    };

    Step {
        id: Uuid::new_v4().to_string(),
        title,
        description: String::new(),
        action_type: event.kind,
        timestamp: event.timestamp,
        source: options.source,
        target: Some(event.target_metadata()),
        input_value,
        input_masked,
        screenshot,
        annotations: Vec::new(),
        ai_summary: None,
        ai_description: None,
        metadata: None,
    }
}

fn synthesize_title(event: &CapturedEvent) -> String {
    match event.kind {
        ActionType::Click => match &event.target.element_text {
            Some(text) if !text.is_empty() => format!("Click \"{}\"", clip(text)),
            _ => "Click element".to_string(),
        },
        ActionType::Input => match &event.target.element_label {
            Some(label) if !label.is_empty() => format!("Enter text in \"{label}\""),
            _ => "Enter text".to_string(),
        },
        ActionType::Navigate => format!("Navigate to {}", url_path(&event.url)),
        ActionType::Select => {
            let option = event.input_value.as_deref().filter(|v| !v.is_empty());
            format!("Select \"{}\"", option.unwrap_or("option"))
        }
        other => format!("{} action", other.as_str()),
    }
}

fn clip(text: &str) -> String {
    text.chars().take(TITLE_TEXT_CLIP).collect()
}

fn url_path(url: &str) -> String {
    Url::parse(url)
        .map(|parsed| parsed.path().to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// A navigation event synthesized from a URL change; returns `None` when
/// only the fragment or query moved.
pub fn detect_navigation(previous_url: Option<&str>, current_url: &str) -> Option<CapturedEvent> {
    let previous = previous_url?;
    if previous == current_url {
        return None;
    }

    let prev = Url::parse(previous).ok()?;
    let curr = Url::parse(current_url).ok()?;
    if prev.origin() == curr.origin() && prev.path() == curr.path() {
        return None;
    }

    Some(CapturedEvent {
        kind: ActionType::Navigate,
        timestamp: Utc::now(),
        url: current_url.to_string(),
        target: Default::default(),
        input_value: None,
    })
}
