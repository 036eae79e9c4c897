// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named service endpoints invoked via events, with optional bounded-blocking
//! wait for completion.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use automaton_core::event::{attr, CALL_SERVICE, SERVICE_EXECUTED, SERVICE_REGISTERED};
use automaton_core::{Priority, ServiceCall};
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use tokio::sync::oneshot;

use crate::event_bus::EventBus;

/// A registered service handler. Runs on a worker thread via
/// [`crate::worker_pool::WorkerPool`]; must not panic (panics are caught and
/// logged by the pool, same as a listener).
pub type ServiceHandler = dyn Fn(ServiceCall) + Send + Sync + 'static;

struct Inner {
    services: Mutex<HashMap<String, HashMap<String, Arc<ServiceHandler>>>>,
    bus: EventBus,
    instance_nonce: String,
    next_call: AtomicU64,
    call_timeout: Duration,
}

/// Registry of named `domain.service` handlers, invoked asynchronously via
/// `call_service` events. Itself a `call_service` listener.
#[derive(Clone)]
pub struct ServiceRegistry {
    inner: Arc<Inner>,
}

impl ServiceRegistry {
    /// `call_timeout` bounds [`ServiceRegistry::call_blocking`]'s wait for
    /// completion (default 10s).
    pub fn new(bus: EventBus, call_timeout: Duration) -> Self {
        let registry = Self {
            inner: Arc::new(Inner {
                services: Mutex::new(HashMap::new()),
                bus,
                instance_nonce: nanoid::nanoid!(8),
                next_call: AtomicU64::new(0),
                call_timeout,
            }),
        };
        registry.subscribe();
        registry
    }

    fn subscribe(&self) {
        let registry = self.clone();
        self.inner.bus.listen(CALL_SERVICE, move |event| {
            let Some(domain) = event.data_str(attr::DOMAIN).map(str::to_string) else {
                return;
            };
            let Some(service) = event.data_str(attr::SERVICE).map(str::to_string) else {
                return;
            };
            let Some(handler) = registry.handler_for(&domain, &service) else {
                return;
            };

            let mut data = event.data.clone();
            data.remove(attr::DOMAIN);
            data.remove(attr::SERVICE);
            let service_call_id = event
                .data_str(attr::SERVICE_CALL_ID)
                .unwrap_or_default()
                .to_string();
            let call = ServiceCall::new(domain, service, service_call_id.clone(), data);

            let bus = registry.inner.bus.clone();
            registry.inner.bus.pool().add_job(
                Priority::Service,
                format!("service:{}.{}", call.domain, call.service),
                Box::new(move || {
                    handler(call);
                    let mut ack = Map::new();
                    ack.insert(attr::SERVICE_CALL_ID.to_string(), json!(service_call_id));
                    bus.fire(SERVICE_EXECUTED, ack);
                }),
            );
        });
    }

    fn handler_for(&self, domain: &str, service: &str) -> Option<Arc<ServiceHandler>> {
        self.inner
            .services
            .lock()
            .get(domain)
            .and_then(|services| services.get(service))
            .cloned()
    }

    /// Registers a handler under `domain.service`, firing `service_registered`.
    pub fn register(
        &self,
        domain: impl Into<String>,
        service: impl Into<String>,
        handler: impl Fn(ServiceCall) + Send + Sync + 'static,
    ) {
        let domain = domain.into();
        let service = service.into();
        self.inner
            .services
            .lock()
            .entry(domain.clone())
            .or_default()
            .insert(service.clone(), Arc::new(handler));

        let mut data = Map::new();
        data.insert(attr::DOMAIN.to_string(), json!(domain));
        data.insert(attr::SERVICE.to_string(), json!(service));
        self.inner.bus.fire(SERVICE_REGISTERED, data);
    }

    pub fn has_service(&self, domain: &str, service: &str) -> bool {
        self.inner
            .services
            .lock()
            .get(domain)
            .is_some_and(|services| services.contains_key(service))
    }

    /// Snapshot of registered service names per domain.
    pub fn services(&self) -> HashMap<String, Vec<String>> {
        self.inner
            .services
            .lock()
            .iter()
            .map(|(domain, services)| (domain.clone(), services.keys().cloned().collect()))
            .collect()
    }

    fn next_call_id(&self) -> String {
        let n = self.inner.next_call.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.inner.instance_nonce)
    }

    /// Fires `call_service` for `domain.service` and returns immediately.
    pub fn call(&self, domain: impl Into<String>, service: impl Into<String>, data: Map<String, Value>) {
        let call_id = self.next_call_id();
        let event_data = with_call_envelope(data, &domain.into(), &service.into(), &call_id);
        self.inner.bus.fire(CALL_SERVICE, event_data);
    }

    /// Fires `call_service` and waits up to the configured timeout for the
    /// matching `service_executed` acknowledgement. Returns whether it
    /// arrived in time; a timed-out call removes its temporary listener.
    pub async fn call_blocking(
        &self,
        domain: impl Into<String>,
        service: impl Into<String>,
        data: Map<String, Value>,
    ) -> bool {
        let domain = domain.into();
        let service = service.into();
        let call_id = self.next_call_id();
        let event_data = with_call_envelope(data, &domain, &service, &call_id);

        let (tx, rx) = oneshot::channel();
        let tx = Mutex::new(Some(tx));
        let awaited_id = call_id.clone();
        let bus = self.inner.bus.clone();
        let handle_cell: Arc<Mutex<Option<crate::event_bus::ListenerHandle>>> =
            Arc::new(Mutex::new(None));
        let handle_cell_inner = handle_cell.clone();
        let bus_inner = bus.clone();
        let handle = bus.listen(SERVICE_EXECUTED, move |event| {
            if event.data_str(attr::SERVICE_CALL_ID) != Some(awaited_id.as_str()) {
                return;
            }
            if let Some(tx) = tx.lock().take() {
                let _ = tx.send(());
            }
            if let Some(handle) = handle_cell_inner.lock().take() {
                bus_inner.remove_listener(&automaton_core::EventType::from(SERVICE_EXECUTED), handle);
            }
        });
        *handle_cell.lock() = Some(handle);

        self.inner.bus.fire(CALL_SERVICE, event_data);

        let completed = tokio::time::timeout(self.inner.call_timeout, rx).await.is_ok();
        if !completed {
            bus.remove_listener(&automaton_core::EventType::from(SERVICE_EXECUTED), handle);
            tracing::warn!(domain, service, call_id, "service call timed out");
        }
        completed
    }
}

fn with_call_envelope(
    mut data: Map<String, Value>,
    domain: &str,
    service: &str,
    call_id: &str,
) -> Map<String, Value> {
    data.insert(attr::DOMAIN.to_string(), json!(domain));
    data.insert(attr::SERVICE.to_string(), json!(service));
    data.insert(attr::SERVICE_CALL_ID.to_string(), json!(call_id));
    data
}

#[cfg(test)]
#[path = "service_registry_tests.rs"]
mod tests;
