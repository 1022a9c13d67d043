//! Sensitive-surface exclusion lists: domains, window titles, and process
//! names that must never be captured.

use log::warn;
use serde::Deserialize;
use url::Url;

/// Substring patterns checked before an event or screenshot is recorded.
/// Domain patterns with a leading dot match hostname suffixes; everything
/// else is a case-insensitive substring match.
#[derive(Debug, Clone)]
pub struct ExclusionConfig {
    pub domains: Vec<String>,
    pub window_titles: Vec<String>,
    pub process_names: Vec<String>,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            domains: to_strings(&[
                "bank.",
                "secure.",
                ".gov",
                "login.",
                "auth.",
                "password",
                "paypal.com",
                "stripe.com",
            ]),
            window_titles: to_strings(&[
                "Password",
                "Keychain",
                "1Password",
                "LastPass",
                "Bitwarden",
                "KeePass",
            ]),
            process_names: to_strings(&[
                "keychain",
                "1password",
                "lastpass",
                "bitwarden",
                "keepass",
            ]),
        }
    }
}

impl ExclusionConfig {
    /// Defaults extended with caller-supplied patterns.
    pub fn with_custom(custom: CustomExclusions) -> Self {
        let mut config = Self::default();
        config.domains.extend(custom.domains);
        config.window_titles.extend(custom.window_titles);
        config.process_names.extend(custom.process_names);
        config
    }

    /// Parses a user exclusion file; falls back to the defaults when the
    /// JSON is unreadable.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<CustomExclusions>(json) {
            Ok(custom) => Self::with_custom(custom),
            Err(err) => {
                warn!("invalid exclusion config, using defaults: {err}");
                Self::default()
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomExclusions {
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub window_titles: Vec<String>,
    #[serde(default)]
    pub process_names: Vec<String>,
}

/// Everything known about where a capture is happening.
#[derive(Debug, Clone, Default)]
pub struct CaptureContext {
    pub url: Option<String>,
    pub window_title: Option<String>,
    pub process_name: Option<String>,
}

pub fn is_excluded_domain(url: &str, config: &ExclusionConfig) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(hostname) = parsed.host_str() else {
        return false;
    };
    let hostname = hostname.to_lowercase();

    config.domains.iter().any(|pattern| {
        let pattern = pattern.to_lowercase();
        if pattern.starts_with('.') {
            hostname.ends_with(&pattern)
        } else {
            hostname.contains(&pattern)
        }
    })
}

pub fn is_excluded_window(window_title: &str, config: &ExclusionConfig) -> bool {
    let title = window_title.to_lowercase();
    config
        .window_titles
        .iter()
        .any(|pattern| title.contains(&pattern.to_lowercase()))
}

pub fn is_excluded_process(process_name: &str, config: &ExclusionConfig) -> bool {
    let process = process_name.to_lowercase();
    config
        .process_names
        .iter()
        .any(|pattern| process.contains(&pattern.to_lowercase()))
}

pub fn should_exclude_capture(context: &CaptureContext, config: &ExclusionConfig) -> bool {
    if let Some(url) = &context.url {
        if is_excluded_domain(url, config) {
            return true;
        }
    }
    if let Some(title) = &context.window_title {
        if is_excluded_window(title, config) {
            return true;
        }
    }
    if let Some(process) = &context.process_name {
        if is_excluded_process(process, config) {
            return true;
        }
    }
    false
}

fn to_strings(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}
