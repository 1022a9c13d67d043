//! Collapses a chronologically ordered raw event stream into the shorter
//! sequence of step-worthy events.
//!
//! Two kinds of noise are removed: keystroke bursts (consecutive same-target
//! inputs within the debounce window become one event carrying the first
//! event's metadata and the last event's timestamp and value) and double
//! submits (rapid same-target clicks collapse to the last click seen). Any
//! other event type flushes pending state immediately, preserving arrival
//! order.

use crate::capture::events::CapturedEvent;
use crate::models::ActionType;

use super::config::GroupingConfig;

pub fn group_events(events: &[CapturedEvent], config: &GroupingConfig) -> Vec<CapturedEvent> {
    let mut grouped: Vec<CapturedEvent> = Vec::new();
    let mut input_group: Vec<CapturedEvent> = Vec::new();
    let mut pending_click: Option<CapturedEvent> = None;

    for event in events {
        match event.kind {
            ActionType::Input => {
                if let Some(last) = input_group.last() {
                    let same_target = last.target.selector == event.target.selector;
                    let elapsed_ms = (event.timestamp - last.timestamp).num_milliseconds();
                    if same_target && elapsed_ms <= config.input_debounce_ms {
                        input_group.push(event.clone());
                        continue;
                    }
                    grouped.push(merge_input_group(&input_group));
                    input_group.clear();
                }
                if let Some(click) = pending_click.take() {
                    grouped.push(click);
                }
                input_group.push(event.clone());
            }
            ActionType::Click => {
                if !input_group.is_empty() {
                    grouped.push(merge_input_group(&input_group));
                    input_group.clear();
                }
                if let Some(last) = pending_click.take() {
                    let same_target = last.target.selector == event.target.selector;
                    let elapsed_ms = (event.timestamp - last.timestamp).num_milliseconds();
                    if !(same_target && elapsed_ms <= config.click_debounce_ms) {
                        grouped.push(last);
                    }
                    // A same-target duplicate is dropped in favor of this
                    // later click.
                }
                pending_click = Some(event.clone());
            }
            _ => {
                if !input_group.is_empty() {
                    grouped.push(merge_input_group(&input_group));
                    input_group.clear();
                }
                if let Some(click) = pending_click.take() {
                    grouped.push(click);
                }
                grouped.push(event.clone());
            }
        }
    }

    if !input_group.is_empty() {
        grouped.push(merge_input_group(&input_group));
    }
    if let Some(click) = pending_click {
        grouped.push(click);
    }

    grouped
}

/// One synthetic event for a keystroke burst: first event's metadata, last
/// event's timestamp and value.
fn merge_input_group(events: &[CapturedEvent]) -> CapturedEvent {
    let first = &events[0];
    let last = &events[events.len() - 1];

    CapturedEvent {
        timestamp: last.timestamp,
        input_value: last.input_value.clone(),
        ..first.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::events::EventTarget;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn event(kind: ActionType, selector: &str, ms: i64, value: Option<&str>) -> CapturedEvent {
        CapturedEvent {
            kind,
            timestamp: at(ms),
            url: "https://app.example.com/form".to_string(),
            target: EventTarget {
                selector: selector.to_string(),
                ..EventTarget::default()
            },
            input_value: value.map(str::to_string),
        }
    }

    #[test]
    fn empty_stream_produces_empty_output() {
        assert!(group_events(&[], &GroupingConfig::default()).is_empty());
    }

    #[test]
    fn single_event_passes_through() {
        let events = vec![event(ActionType::Scroll, "#main", 0, None)];
        assert_eq!(group_events(&events, &GroupingConfig::default()), events);
    }

    #[test]
    fn keystroke_burst_collapses_to_last_value() {
        let events = vec![
            event(ActionType::Input, "#a", 0, Some("h")),
            event(ActionType::Input, "#a", 100, Some("he")),
            event(ActionType::Input, "#a", 300, Some("hel")),
            event(ActionType::Input, "#a", 900, Some("hello")),
        ];
        let grouped = group_events(&events, &GroupingConfig::default());

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].timestamp, at(300));
        assert_eq!(grouped[0].input_value.as_deref(), Some("hel"));
        assert_eq!(grouped[1].timestamp, at(900));
        assert_eq!(grouped[1].input_value.as_deref(), Some("hello"));
    }

    #[test]
    fn click_dedup_keeps_the_later_click() {
        let events = vec![
            event(ActionType::Click, "#a", 0, None),
            event(ActionType::Click, "#a", 50, None),
            event(ActionType::Click, "#b", 60, None),
        ];
        let grouped = group_events(&events, &GroupingConfig::default());

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].target.selector, "#a");
        assert_eq!(grouped[0].timestamp, at(50));
        assert_eq!(grouped[1].target.selector, "#b");
        assert_eq!(grouped[1].timestamp, at(60));
    }

    #[test]
    fn slow_clicks_on_same_target_both_survive() {
        let events = vec![
            event(ActionType::Click, "#a", 0, None),
            event(ActionType::Click, "#a", 500, None),
        ];
        let grouped = group_events(&events, &GroupingConfig::default());
        assert_eq!(grouped.len(), 2);
    }

    #[test]
    fn target_switch_mid_burst_forces_a_flush() {
        let events = vec![
            event(ActionType::Input, "#a", 0, Some("a")),
            event(ActionType::Input, "#b", 50, Some("b")),
        ];
        let grouped = group_events(&events, &GroupingConfig::default());

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].target.selector, "#a");
        assert_eq!(grouped[1].target.selector, "#b");
    }

    #[test]
    fn other_event_flushes_pending_state_in_arrival_order() {
        let events = vec![
            event(ActionType::Input, "#a", 0, Some("a")),
            event(ActionType::Input, "#a", 100, Some("ab")),
            event(ActionType::Scroll, "#main", 150, None),
            event(ActionType::Click, "#submit", 200, None),
            event(ActionType::Key, "#submit", 250, Some("Enter")),
        ];
        let grouped = group_events(&events, &GroupingConfig::default());

        let kinds: Vec<ActionType> = grouped.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActionType::Input,
                ActionType::Scroll,
                ActionType::Click,
                ActionType::Key
            ]
        );
    }

    #[test]
    fn pending_click_is_flushed_before_a_following_input() {
        let events = vec![
            event(ActionType::Click, "#field", 0, None),
            event(ActionType::Input, "#field", 50, Some("x")),
        ];
        let grouped = group_events(&events, &GroupingConfig::default());

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].kind, ActionType::Click);
        assert_eq!(grouped[1].kind, ActionType::Input);
    }

    #[test]
    fn merged_event_keeps_first_events_metadata() {
        let mut first = event(ActionType::Input, "#a", 0, Some("h"));
        first.target.element_label = Some("Email".to_string());
        let events = vec![first, event(ActionType::Input, "#a", 100, Some("hi"))];

        let grouped = group_events(&events, &GroupingConfig::default());
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].target.element_label.as_deref(), Some("Email"));
        assert_eq!(grouped[0].input_value.as_deref(), Some("hi"));
    }
}
