// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event type and the immutable `Event` record broadcast on the bus.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::fmt;

/// Sentinel event type that subscribes a listener to every fired event.
pub const MATCH_ALL: &str = "*";

/// Fired once, right after the kernel starts the timer.
pub const AUTOMATON_START: &str = "automaton_start";
/// Fired when `Kernel::stop` begins shutdown.
pub const AUTOMATON_STOP: &str = "automaton_stop";
/// Fired by `StateMachine::set` whenever an entity's state or attributes change.
pub const STATE_CHANGED: &str = "state_changed";
/// Fired by the Timer on every aligned wall-clock tick.
pub const TIME_CHANGED: &str = "time_changed";
/// Fired by `ServiceRegistry::call` to dispatch a service invocation.
pub const CALL_SERVICE: &str = "call_service";
/// Fired by `ServiceRegistry` after a service handler returns.
pub const SERVICE_EXECUTED: &str = "service_executed";
/// Fired by `ServiceRegistry::register` when a new service is added.
pub const SERVICE_REGISTERED: &str = "service_registered";

/// Reserved event-data attribute keys.
pub mod attr {
    pub const NOW: &str = "now";
    pub const DOMAIN: &str = "domain";
    pub const SERVICE: &str = "service";
    pub const SERVICE_CALL_ID: &str = "service_call_id";
    pub const ENTITY_ID: &str = "entity_id";
    pub const NEW_STATE: &str = "new_state";
    pub const OLD_STATE: &str = "old_state";
}

/// The reserved service that triggers kernel shutdown.
pub const STOP_DOMAIN: &str = "automaton";
pub const STOP_SERVICE: &str = "stop";

/// An event type string. Cheap to clone, comparable by value, usable as a
/// `HashMap` key without allocating on lookup (`Borrow<str>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventType(pub String);

impl EventType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_match_all(&self) -> bool {
        self.0 == MATCH_ALL
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EventType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Borrow<str> for EventType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for EventType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// Where an event originated. Listeners may use this to distinguish events
/// synthesized locally from ones replayed from an external source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOrigin {
    Local,
    Remote,
}

crate::simple_display! {
    EventOrigin {
        Local => "LOCAL",
        Remote => "REMOTE",
    }
}

/// An immutable event broadcast on the bus. Equality is purely structural —
/// two events with the same type, data, and origin are equal regardless of
/// when they were constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub data: Map<String, Value>,
    pub origin: EventOrigin,
}

impl Event {
    pub fn new(event_type: impl Into<EventType>, data: Map<String, Value>) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            origin: EventOrigin::Local,
        }
    }

    pub fn with_origin(
        event_type: impl Into<EventType>,
        data: Map<String, Value>,
        origin: EventOrigin,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            data,
            origin,
        }
    }

    /// Convenience accessor for a string-valued data field.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data.is_empty() {
            write!(f, "<Event {}[{}]>", self.event_type, &self.origin.to_string()[..1])
        } else {
            write!(
                f,
                "<Event {}[{}]: {:?}>",
                self.event_type,
                &self.origin.to_string()[..1],
                self.data
            )
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
