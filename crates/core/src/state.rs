// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The immutable `State` value held per entity in the `StateMachine`.

use chrono::{DateTime, SubsecRound, Utc};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::entity::normalize_entity_id;
use crate::error::KernelError;

/// A snapshot of one entity's state. Two `State`s are equal when their
/// `entity_id`, `state`, and `attributes` match; timestamps never
/// participate in equality.
#[derive(Debug, Clone)]
pub struct State {
    pub entity_id: String,
    pub state: String,
    pub attributes: Map<String, Value>,
    pub last_changed: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl State {
    /// Builds a new State, validating and lowercasing `entity_id`.
    /// `last_changed` and `last_updated` are both set to `now`, truncated to
    /// whole seconds.
    pub fn new(
        entity_id: &str,
        state: impl Into<String>,
        attributes: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<Self, KernelError> {
        let entity_id = normalize_entity_id(entity_id)?;
        let now = now.trunc_subsecs(0);
        Ok(Self {
            entity_id,
            state: state.into(),
            attributes,
            last_changed: now,
            last_updated: now,
        })
    }

    /// Builds the successor State for a `set` call that changes `state` or
    /// `attributes`. `last_changed` carries forward from `self` when `state`
    /// is unchanged and only `attributes` differ; otherwise it resets to
    /// `now`.
    pub fn transition(
        &self,
        state: impl Into<String>,
        attributes: Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Self {
        let state = state.into();
        let now = now.trunc_subsecs(0);
        let last_changed = if state == self.state {
            self.last_changed
        } else {
            now
        };
        Self {
            entity_id: self.entity_id.clone(),
            state,
            attributes,
            last_changed,
            last_updated: now,
        }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.entity_id == other.entity_id
            && self.state == other.state
            && self.attributes == other.attributes
    }
}

impl Eq for State {}

#[derive(Serialize, Deserialize)]
struct StateWire {
    entity_id: String,
    state: String,
    attributes: Map<String, Value>,
    last_changed: DateTime<Utc>,
}

impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StateWire {
            entity_id: self.entity_id.clone(),
            state: self.state.clone(),
            attributes: self.attributes.clone(),
            last_changed: self.last_changed,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = StateWire::deserialize(deserializer)?;
        let entity_id = normalize_entity_id(&wire.entity_id).map_err(DeError::custom)?;
        Ok(State {
            entity_id,
            state: wire.state,
            attributes: wire.attributes,
            last_changed: wire.last_changed,
            last_updated: Utc::now(),
        })
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
