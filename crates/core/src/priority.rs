// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job priority bands for the worker pool's priority queue.
//!
//! Lower numeric value sorts first. Ordering is derived so `Priority::Callback
//! < Priority::Default`, which is exactly what a `BinaryHeap<Reverse<..>>`
//! min-heap in `automaton-engine` needs.

use crate::event::EventType;

/// A priority band for a job enqueued onto the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// `service-executed` — acknowledgements should be delivered promptly.
    Callback = 0,
    /// `call-service` — service dispatch.
    Service = 1,
    /// `state-changed` — entity state transitions.
    State = 2,
    /// `time-changed` — timer ticks.
    Time = 3,
    /// Everything else, including custom component events.
    Default = 4,
}

impl Priority {
    /// Maps an event type to its dispatch priority, per the band table.
    pub fn for_event_type(event_type: &EventType) -> Priority {
        match event_type.as_str() {
            crate::event::SERVICE_EXECUTED => Priority::Callback,
            crate::event::CALL_SERVICE => Priority::Service,
            crate::event::STATE_CHANGED => Priority::State,
            crate::event::TIME_CHANGED => Priority::Time,
            _ => Priority::Default,
        }
    }
}

crate::simple_display! {
    Priority {
        Callback => "callback",
        Service => "service",
        State => "state",
        Time => "time",
        Default => "default",
    }
}

#[cfg(test)]
#[path = "priority_tests.rs"]
mod tests;
