// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyed registry of entity states; emits `state_changed` events on mutation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use automaton_core::entity::normalize_entity_id;
use automaton_core::event::{attr, STATE_CHANGED};
use automaton_core::{Clock, KernelError, State, MATCH_ALL};
use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};

use crate::event_bus::EventBus;

/// A pattern matched against a single state-string field, used by
/// [`StateMachine::track_change`]'s `from_state`/`to_state` filters.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches any value, including absence of a prior state.
    MatchAll,
    /// Matches only the listed values.
    Values(HashSet<String>),
}

impl Pattern {
    fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Pattern::MatchAll => true,
            Pattern::Values(values) => value.is_some_and(|v| values.contains(v)),
        }
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Pattern::MatchAll
    }
}

impl From<&str> for Pattern {
    fn from(s: &str) -> Self {
        if s == MATCH_ALL {
            Pattern::MatchAll
        } else {
            Pattern::Values(HashSet::from([s.to_string()]))
        }
    }
}

impl<const N: usize> From<[&str; N]> for Pattern {
    fn from(values: [&str; N]) -> Self {
        Pattern::Values(values.iter().map(|s| s.to_string()).collect())
    }
}

struct Inner<C: Clock> {
    states: Mutex<HashMap<String, State>>,
    bus: EventBus,
    clock: C,
}

/// Thread-safe registry of entity states. Reads always return owned copies;
/// no caller can observe or mutate the live map.
#[derive(Clone)]
pub struct StateMachine<C: Clock> {
    inner: Arc<Inner<C>>,
}

impl<C: Clock> StateMachine<C> {
    pub fn new(bus: EventBus, clock: C) -> Self {
        Self {
            inner: Arc::new(Inner {
                states: Mutex::new(HashMap::new()),
                bus,
                clock,
            }),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let secs = self.inner.clock.now_secs();
        DateTime::from_timestamp(secs as i64, 0)
            .unwrap_or_else(Utc::now)
            .trunc_subsecs(0)
    }

    /// Entity ids currently registered, optionally filtered by domain
    /// (case-insensitive prefix match on `<domain>.`).
    pub fn entity_ids(&self, domain_filter: Option<&str>) -> Vec<String> {
        let filter = domain_filter.map(str::to_ascii_lowercase);
        let mut ids: Vec<String> = self
            .inner
            .states
            .lock()
            .keys()
            .filter(|id| match &filter {
                Some(domain) => id.split_once('.').is_some_and(|(d, _)| d == domain),
                None => true,
            })
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// A copy of every registered State.
    pub fn all(&self) -> Vec<State> {
        self.inner.states.lock().values().cloned().collect()
    }

    /// A copy of one entity's State, if registered.
    pub fn get(&self, entity_id: &str) -> Option<State> {
        let entity_id = normalize_entity_id(entity_id).ok()?;
        self.inner.states.lock().get(&entity_id).cloned()
    }

    /// States whose `last_updated` is at or after `since` (truncated to
    /// whole seconds before comparison).
    pub fn get_since(&self, since: DateTime<Utc>) -> Vec<State> {
        let since = since.trunc_subsecs(0);
        self.inner
            .states
            .lock()
            .values()
            .filter(|state| state.last_updated >= since)
            .cloned()
            .collect()
    }

    pub fn is_state(&self, entity_id: &str, state: &str) -> bool {
        self.get(entity_id).is_some_and(|s| s.state == state)
    }

    /// Removes an entity's state. Emits no event. Returns whether it existed.
    pub fn remove(&self, entity_id: &str) -> bool {
        let Ok(entity_id) = normalize_entity_id(entity_id) else {
            return false;
        };
        self.inner.states.lock().remove(&entity_id).is_some()
    }

    /// Sets an entity's state, inserting or transitioning it. Fires exactly
    /// one `state_changed` event when `(state, attributes)` changes; a
    /// no-op `set` emits nothing.
    pub fn set(
        &self,
        entity_id: &str,
        new_state: impl Into<String>,
        attributes: Map<String, Value>,
    ) -> Result<(), KernelError> {
        let entity_id = normalize_entity_id(entity_id)?;
        let new_state = new_state.into();
        let now = self.now();

        let mut states = self.inner.states.lock();
        let prior = states.get(&entity_id).cloned();

        let unchanged = prior
            .as_ref()
            .is_some_and(|p| p.state == new_state && p.attributes == attributes);
        if unchanged {
            return Ok(());
        }

        let next = match &prior {
            Some(p) => p.transition(new_state, attributes, now),
            None => State::new(&entity_id, new_state, attributes, now)?,
        };
        states.insert(entity_id.clone(), next.clone());
        drop(states);

        let mut data = Map::new();
        data.insert(attr::ENTITY_ID.to_string(), json!(entity_id));
        data.insert(attr::NEW_STATE.to_string(), state_to_json(&next));
        if let Some(prior) = prior {
            data.insert(attr::OLD_STATE.to_string(), state_to_json(&prior));
        }
        self.inner.bus.fire(STATE_CHANGED, data);
        Ok(())
    }

    /// Registers a `state_changed` listener firing `action(entity_id,
    /// old_state, new_state)` when the changed entity is in `entity_ids`
    /// and the old/new state strings match `from_state`/`to_state`.
    pub fn track_change(
        &self,
        entity_ids: impl IntoIterator<Item = impl AsRef<str>>,
        action: impl Fn(String, Option<State>, State) + Send + Sync + 'static,
        from_state: Pattern,
        to_state: Pattern,
    ) {
        let watched: HashSet<String> = entity_ids
            .into_iter()
            .filter_map(|id| normalize_entity_id(id.as_ref()).ok())
            .collect();
        self.inner.bus.listen(STATE_CHANGED, move |event| {
            let Some(entity_id) = event.data_str(attr::ENTITY_ID) else {
                return;
            };
            if !watched.contains(entity_id) {
                return;
            }
            let old_state = event.data.get(attr::OLD_STATE).and_then(state_from_json);
            let Some(new_state) = event.data.get(attr::NEW_STATE).and_then(state_from_json) else {
                return;
            };
            if !from_state.matches(old_state.as_ref().map(|s| s.state.as_str())) {
                return;
            }
            if !to_state.matches(Some(new_state.state.as_str())) {
                return;
            }
            action(entity_id.to_string(), old_state, new_state);
        });
    }
}

fn state_to_json(state: &State) -> Value {
    serde_json::to_value(state).unwrap_or(Value::Null)
}

fn state_from_json(value: &Value) -> Option<State> {
    serde_json::from_value(value.clone()).ok()
}

#[cfg(test)]
#[path = "state_machine_tests.rs"]
mod tests;
