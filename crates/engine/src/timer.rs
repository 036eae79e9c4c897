// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Monotonic tick source firing `time_changed` events aligned to wall-clock
//! second boundaries.

use std::time::Duration;

use automaton_core::event::{attr, TIME_CHANGED};
use automaton_core::Clock;
use serde_json::{json, Map};
use tokio::task::JoinHandle;

use crate::event_bus::EventBus;

/// Dedicated tick source. Spawned by the kernel facade on start, aborted on
/// stop; not constructed or driven directly by components.
pub struct Timer {
    handle: JoinHandle<()>,
}

impl Timer {
    /// `interval` must evenly divide 60 seconds so ticks align to the same
    /// wall-clock boundaries every minute.
    pub fn start<C: Clock>(bus: EventBus, clock: C, interval: Duration) -> Self {
        debug_assert!(
            interval.as_secs() > 0 && 60 % interval.as_secs() == 0,
            "timer interval must evenly divide 60 seconds",
        );
        let handle = tokio::spawn(run(bus, clock, interval));
        Self { handle }
    }

    /// Aborts the tick loop. Safe to call more than once.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run<C: Clock>(bus: EventBus, clock: C, interval: Duration) {
    let interval_secs = interval.as_secs().max(1);
    let mut last_fired_on_second: Option<u64> = None;

    loop {
        let now = clock.now();
        let second = now.as_secs();

        let aligned = second % interval_secs == 0;
        let already_fired = last_fired_on_second == Some(second);
        if !aligned || already_fired {
            let next_boundary = (second / interval_secs + 1) * interval_secs;
            let sleep_target = Duration::from_secs(next_boundary) + Duration::from_millis(500);
            let sleep_for = sleep_target.saturating_sub(now);
            tokio::time::sleep(sleep_for).await;
            continue;
        }

        last_fired_on_second = Some(second);
        let mut data = Map::new();
        data.insert(attr::NOW.to_string(), json!(second));
        bus.fire(TIME_CHANGED, data);
    }
}

#[cfg(test)]
#[path = "timer_tests.rs"]
mod tests;
