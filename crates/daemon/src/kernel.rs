// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composes the worker pool, event bus, state machine, service registry,
//! and timer; exposes kernel lifecycle and the convenience `track_*`
//! listeners.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use automaton_core::event::{attr, AUTOMATON_START, AUTOMATON_STOP, STOP_DOMAIN, STOP_SERVICE, TIME_CHANGED};
use automaton_core::{Clock, EventType, SystemClock};
use automaton_engine::{EventBus, ListenerHandle, ServiceRegistry, StateMachine, Timer, WorkerPool};
use chrono::{DateTime, Datelike, Timelike, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tokio::sync::Notify;

use crate::config::KernelConfig;

/// A pattern matched against a single calendar field (year, month, day,
/// hour, minute, second) in [`Kernel::track_time_change`].
#[derive(Debug, Clone)]
pub enum TimeField {
    /// Matches any value.
    Any,
    /// Matches only the listed values.
    Values(HashSet<u32>),
}

impl TimeField {
    fn matches(&self, value: u32) -> bool {
        match self {
            TimeField::Any => true,
            TimeField::Values(values) => values.contains(&value),
        }
    }
}

impl From<u32> for TimeField {
    fn from(value: u32) -> Self {
        TimeField::Values(HashSet::from([value]))
    }
}

impl<const N: usize> From<[u32; N]> for TimeField {
    fn from(values: [u32; N]) -> Self {
        TimeField::Values(values.into_iter().collect())
    }
}

/// The automation kernel: the worker pool, event bus, state machine, and
/// service registry, plus a timer started on [`Kernel::start`].
#[derive(Clone)]
pub struct Kernel<C: Clock = SystemClock> {
    pool: WorkerPool,
    bus: EventBus,
    states: StateMachine<C>,
    services: ServiceRegistry,
    clock: C,
    config: KernelConfig,
    timer: Arc<Mutex<Option<Timer>>>,
    stop_notify: Arc<Notify>,
}

impl Kernel<SystemClock> {
    pub fn new(config: KernelConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Kernel<C> {
    pub fn with_clock(config: KernelConfig, clock: C) -> Self {
        let pool = WorkerPool::new(config.min_workers, config.busy_threshold_factor);
        let bus = EventBus::new(pool.clone());
        let states = StateMachine::new(bus.clone(), clock.clone());
        let services = ServiceRegistry::new(bus.clone(), config.service_call_timeout);
        Self {
            pool,
            bus,
            states,
            services,
            clock,
            config,
            timer: Arc::new(Mutex::new(None)),
            stop_notify: Arc::new(Notify::new()),
        }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn states(&self) -> &StateMachine<C> {
        &self.states
    }

    pub fn services(&self) -> &ServiceRegistry {
        &self.services
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// Starts the timer and fires `automaton_start`.
    pub fn start(&self) {
        let timer = Timer::start(self.bus.clone(), self.clock.clone(), self.config.timer_interval);
        *self.timer.lock() = Some(timer);
        self.bus.fire(AUTOMATON_START, Map::new());
    }

    /// Registers the reserved `automaton.stop` service, then blocks until
    /// it is invoked or the process receives an interrupt signal, polling
    /// every second. Calls [`Kernel::stop`] before returning.
    pub async fn block_till_stopped(&self) {
        let notify = self.stop_notify.clone();
        self.services.register(STOP_DOMAIN, STOP_SERVICE, move |_call| {
            notify.notify_one();
        });

        loop {
            tokio::select! {
                _ = self.stop_notify.notified() => break,
                _ = tokio::signal::ctrl_c() => break,
                _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => continue,
            }
        }
        self.stop().await;
    }

    /// Fires `automaton_stop`, waits for the pool to drain, then stops the
    /// timer and pool.
    pub async fn stop(&self) {
        self.bus.fire(AUTOMATON_STOP, Map::new());
        self.pool.block_till_done().await;
        self.pool.stop();
        if let Some(timer) = self.timer.lock().take() {
            timer.stop();
        }
    }

    /// Registers a `time_changed` listener that fires `action(now)` exactly
    /// once, the first time `now >= at`, then removes itself.
    pub fn track_point_in_time(&self, action: impl Fn(DateTime<Utc>) + Send + Sync + 'static, at: DateTime<Utc>) {
        let fired = AtomicBool::new(false);
        let handle_cell: Arc<Mutex<Option<ListenerHandle>>> = Arc::new(Mutex::new(None));
        let handle_cell_inner = handle_cell.clone();
        let bus = self.bus.clone();
        let handle = self.bus.listen(TIME_CHANGED, move |event| {
            let Some(now) = event_now(&event) else { return };
            if now < at {
                return;
            }
            if fired.swap(true, Ordering::AcqRel) {
                return;
            }
            if let Some(handle) = handle_cell_inner.lock().take() {
                bus.remove_listener(&EventType::from(TIME_CHANGED), handle);
            }
            action(now);
        });
        *handle_cell.lock() = Some(handle);
    }

    /// Registers a `time_changed` listener that fires `action(now)` whenever
    /// every calendar field matches its pattern (`TimeField::Any` or a
    /// finite set of allowed values).
    #[allow(clippy::too_many_arguments)]
    pub fn track_time_change(
        &self,
        action: impl Fn(DateTime<Utc>) + Send + Sync + 'static,
        year: TimeField,
        month: TimeField,
        day: TimeField,
        hour: TimeField,
        minute: TimeField,
        second: TimeField,
    ) {
        self.bus.listen(TIME_CHANGED, move |event| {
            let Some(now) = event_now(&event) else { return };
            if !year.matches(now.year() as u32)
                || !month.matches(now.month())
                || !day.matches(now.day())
                || !hour.matches(now.hour())
                || !minute.matches(now.minute())
                || !second.matches(now.second())
            {
                return;
            }
            action(now);
        });
    }
}

fn event_now(event: &automaton_core::Event) -> Option<DateTime<Utc>> {
    let secs = event.data.get(attr::NOW).and_then(Value::as_u64)?;
    DateTime::from_timestamp(secs as i64, 0)
}

#[cfg(test)]
#[path = "kernel_tests.rs"]
mod tests;
