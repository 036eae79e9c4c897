// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscribe/unsubscribe/fire, fanning out to listeners through the pool.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use automaton_core::event::TIME_CHANGED;
use automaton_core::{Event, EventOrigin, EventType, Priority, MATCH_ALL};
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::worker_pool::WorkerPool;

/// A subscriber callback. Runs on a worker thread; must not panic the
/// process (panics are caught by the pool and logged).
pub type ListenerFn = dyn Fn(Event) + Send + Sync + 'static;

/// An opaque, referentially-unique token identifying a subscription,
/// standing in for closure-identity removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

struct Subscription {
    handle: ListenerHandle,
    listener: Arc<ListenerFn>,
}

struct Inner {
    listeners: Mutex<HashMap<EventType, Vec<Subscription>>>,
    next_handle: AtomicU64,
    pool: WorkerPool,
}

/// Fan-out event bus: listeners subscribe per event type (or [`MATCH_ALL`]),
/// `fire` enqueues one pool job per matching listener and returns
/// immediately.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    pub fn new(pool: WorkerPool) -> Self {
        Self {
            inner: Arc::new(Inner {
                listeners: Mutex::new(HashMap::new()),
                next_handle: AtomicU64::new(0),
                pool,
            }),
        }
    }

    fn alloc_handle(&self) -> ListenerHandle {
        ListenerHandle(self.inner.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    fn insert(&self, event_type: EventType, handle: ListenerHandle, listener: Arc<ListenerFn>) {
        self.inner
            .listeners
            .lock()
            .entry(event_type)
            .or_default()
            .push(Subscription { handle, listener });
    }

    /// Appends a listener. Duplicates (even identical closures) are allowed.
    pub fn listen(
        &self,
        event_type: impl Into<EventType>,
        listener: impl Fn(Event) + Send + Sync + 'static,
    ) -> ListenerHandle {
        let handle = self.alloc_handle();
        self.insert(event_type.into(), handle, Arc::new(listener));
        handle
    }

    /// Wraps `listener` so it runs at most once, even if two copies of it
    /// were already enqueued before the first invocation removes it.
    pub fn listen_once(
        &self,
        event_type: impl Into<EventType>,
        listener: impl Fn(Event) + Send + Sync + 'static,
    ) -> ListenerHandle {
        let event_type = event_type.into();
        let handle = self.alloc_handle();
        let fired = Arc::new(AtomicBool::new(false));
        let bus = self.clone();
        let removal_type = event_type.clone();
        let guarded = move |event: Event| {
            if fired.swap(true, Ordering::AcqRel) {
                return;
            }
            bus.remove_listener(&removal_type, handle);
            listener(event);
        };
        self.insert(event_type, handle, Arc::new(guarded));
        handle
    }

    /// Removes the first entry matching `handle`. Absent handle is a
    /// silent no-op. Drops the bucket key if it becomes empty.
    pub fn remove_listener(&self, event_type: &EventType, handle: ListenerHandle) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let Some(bucket) = listeners.get_mut(event_type) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|sub| sub.handle != handle);
        let removed = bucket.len() != before;
        if bucket.is_empty() {
            listeners.remove(event_type);
        }
        removed
    }

    /// The backing pool, for callers (the kernel facade, tests) that need to
    /// drain or introspect it directly.
    pub fn pool(&self) -> &WorkerPool {
        &self.inner.pool
    }

    /// Snapshot of listener counts per event type.
    pub fn listener_counts(&self) -> HashMap<String, usize> {
        self.inner
            .listeners
            .lock()
            .iter()
            .map(|(event_type, bucket)| (event_type.to_string(), bucket.len()))
            .collect()
    }

    /// Fires a LOCAL-origin event. Returns the number of listeners the
    /// event fanned out to (MATCH_ALL listeners first, then type-specific).
    pub fn fire(&self, event_type: impl Into<EventType>, data: Map<String, Value>) -> usize {
        self.fire_with_origin(event_type, data, EventOrigin::Local)
    }

    pub fn fire_with_origin(
        &self,
        event_type: impl Into<EventType>,
        data: Map<String, Value>,
        origin: EventOrigin,
    ) -> usize {
        let event_type = event_type.into();
        let snapshot = {
            let listeners = self.inner.listeners.lock();
            let mut combined = Vec::new();
            if !event_type.is_match_all() {
                if let Some(all) = listeners.get(&EventType::from(MATCH_ALL)) {
                    combined.extend(all.iter().map(|sub| sub.listener.clone()));
                }
            }
            if let Some(specific) = listeners.get(&event_type) {
                combined.extend(specific.iter().map(|sub| sub.listener.clone()));
            }
            combined
        };

        if event_type.as_str() != TIME_CHANGED {
            tracing::info!(event_type = %event_type, %origin, "event fired");
        }

        let event = Event::with_origin(event_type.clone(), data, origin);
        let priority = Priority::for_event_type(&event_type);
        let count = snapshot.len();
        for listener in snapshot {
            let event = event.clone();
            let descriptor = format!("listener:{event_type}");
            self.inner
                .pool
                .add_job(priority, descriptor, Box::new(move || listener(event)));
        }
        count
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
