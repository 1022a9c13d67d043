//! The caller-held handle for one recording session.
//!
//! Nothing here is process-global: every live recording is a
//! [`CaptureSession`] value owned by its caller, so concurrent sessions
//! against different guides are representable. The autosave loop observes
//! the session only through the cloneable [`GuideHandle`] snapshot accessor.

use std::sync::{Arc, RwLock};

use log::debug;

use crate::document::ops::{add_step_to_guide, create_guide};
use crate::error::Result;
use crate::grouping::{group_events, GroupingConfig};
use crate::models::{CaptureSource, Guide, GuideSource, Screenshot};

use super::events::CapturedEvent;
use super::exclusions::{should_exclude_capture, CaptureContext, ExclusionConfig};
use super::synthesize::{synthesize_step, CaptureOptions};

/// Cloneable read-only view of a session's current guide. `snapshot`
/// returns an atomic, complete copy or nothing; it can never observe a
/// half-applied edit.
#[derive(Clone)]
pub struct GuideHandle {
    inner: Arc<RwLock<Guide>>,
}

impl GuideHandle {
    pub fn snapshot(&self) -> Option<Guide> {
        match self.inner.read() {
            Ok(guard) => Some(guard.clone()),
            Err(poisoned) => Some(poisoned.into_inner().clone()),
        }
    }
}

/// One in-progress recording: the working guide plus the raw event buffer
/// that has not been grouped into steps yet.
pub struct CaptureSession {
    shared: Arc<RwLock<Guide>>,
    pending: Vec<CapturedEvent>,
    grouping: GroupingConfig,
    exclusions: ExclusionConfig,
    options: CaptureOptions,
    excluded_count: u64,
}

impl CaptureSession {
    pub fn new(title: impl Into<String>, options: CaptureOptions) -> Self {
        let source = match options.source {
            CaptureSource::Chrome => GuideSource::Chrome,
            CaptureSource::Desktop => GuideSource::Desktop,
            // Manual capture starts as a desktop-style document.
            CaptureSource::Manual => GuideSource::Desktop,
        };
        Self::from_guide(create_guide(title, source), options)
    }

    /// Resumes a session over an existing document (editor reopen,
    /// post-recovery continuation).
    pub fn from_guide(guide: Guide, options: CaptureOptions) -> Self {
        Self {
            shared: Arc::new(RwLock::new(guide)),
            pending: Vec::new(),
            grouping: GroupingConfig::default(),
            exclusions: ExclusionConfig::default(),
            options,
            excluded_count: 0,
        }
    }

    pub fn with_grouping(mut self, grouping: GroupingConfig) -> Self {
        self.grouping = grouping;
        self
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionConfig) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Buffers one raw event. Events on excluded surfaces are dropped and
    /// counted, never recorded.
    pub fn record_event(&mut self, event: CapturedEvent) {
        let context = CaptureContext {
            url: if event.url.is_empty() {
                None
            } else {
                Some(event.url.clone())
            },
            ..CaptureContext::default()
        };
        if should_exclude_capture(&context, &self.exclusions) {
            self.excluded_count += 1;
            debug!("dropped event on excluded surface: {}", event.url);
            return;
        }
        self.pending.push(event);
    }

    /// Groups the buffered raw events and appends the resulting steps to
    /// the guide. Returns how many steps were appended.
    pub fn flush_events(&mut self) -> Result<usize> {
        let grouped = group_events(&self.pending, &self.grouping);
        self.pending.clear();

        let mut guide = self.read_guide();
        let appended = grouped.len();
        for event in &grouped {
            let step = synthesize_step(event, None, &self.options);
            guide = add_step_to_guide(&guide, step)?;
        }
        self.write_guide(guide);
        Ok(appended)
    }

    /// Synthesizes and appends one event immediately, bypassing the buffer.
    /// Used when the caller already has the screenshot for the action.
    pub fn append_captured(
        &mut self,
        event: &CapturedEvent,
        screenshot: Option<Screenshot>,
    ) -> Result<()> {
        let step = synthesize_step(event, screenshot, &self.options);
        let guide = add_step_to_guide(&self.read_guide(), step)?;
        self.write_guide(guide);
        Ok(())
    }

    /// Replaces the working document, e.g. after an editor-side mutation.
    pub fn replace_guide(&mut self, guide: Guide) {
        self.write_guide(guide);
    }

    pub fn guide(&self) -> Guide {
        self.read_guide()
    }

    pub fn handle(&self) -> GuideHandle {
        GuideHandle {
            inner: Arc::clone(&self.shared),
        }
    }

    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    pub fn excluded_events(&self) -> u64 {
        self.excluded_count
    }

    fn read_guide(&self) -> Guide {
        match self.shared.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write_guide(&self, guide: Guide) {
        match self.shared.write() {
            Ok(mut guard) => *guard = guide,
            Err(poisoned) => *poisoned.into_inner() = guide,
        }
    }
}
