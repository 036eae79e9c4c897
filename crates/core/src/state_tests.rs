// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use serde_json::json;

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 500_000_000).unwrap()
}

#[test]
fn new_normalizes_and_lowercases_entity_id() {
    let state = State::new("LIGHT.Kitchen", "on", Map::new(), at(100)).unwrap();
    assert_eq!(state.entity_id, "light.kitchen");
}

#[test]
fn new_rejects_malformed_entity_id() {
    assert!(State::new("badid", "on", Map::new(), at(100)).is_err());
}

#[test]
fn new_truncates_last_changed_to_whole_seconds() {
    let state = State::new("light.kitchen", "on", Map::new(), at(100)).unwrap();
    assert_eq!(state.last_changed.timestamp_subsec_nanos(), 0);
    assert_eq!(state.last_changed, state.last_updated);
}

#[test]
fn transition_resets_last_changed_when_state_differs() {
    let first = State::new("switch.a", "on", Map::new(), at(100)).unwrap();
    let second = first.transition("off", Map::new(), at(200));
    assert_eq!(second.last_changed, at(200).trunc_subsecs(0));
}

#[test]
fn transition_preserves_last_changed_when_only_attributes_differ() {
    let first = State::new("switch.a", "on", Map::new(), at(100)).unwrap();
    let mut attrs = Map::new();
    attrs.insert("bri".to_string(), json!(128));
    let second = first.transition("on", attrs, at(200));
    assert_eq!(second.last_changed, first.last_changed);
    assert_eq!(second.last_updated, at(200).trunc_subsecs(0));
}

#[test]
fn equality_ignores_timestamps() {
    let a = State::new("light.kitchen", "on", Map::new(), at(100)).unwrap();
    let b = State::new("light.kitchen", "on", Map::new(), at(999)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn equality_distinguishes_different_attributes() {
    let mut attrs = Map::new();
    attrs.insert("bri".to_string(), json!(128));
    let a = State::new("light.kitchen", "on", Map::new(), at(100)).unwrap();
    let b = State::new("light.kitchen", "on", attrs, at(100)).unwrap();
    assert_ne!(a, b);
}

#[test]
fn serialize_omits_last_updated_and_round_trips_under_equality() {
    let state = State::new("light.kitchen", "on", Map::new(), at(100)).unwrap();
    let json = serde_json::to_value(&state).unwrap();
    assert!(json.get("last_updated").is_none());
    assert!(json.get("last_changed").is_some());

    let restored: State = serde_json::from_value(json).unwrap();
    assert_eq!(restored, state);
    assert_eq!(restored.last_changed, state.last_changed);
}
