// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::worker_pool::WorkerPool;
use std::sync::Mutex as StdMutex;
use std::time::Duration as StdDuration;

fn registry(timeout: Duration) -> (EventBus, ServiceRegistry) {
    let bus = EventBus::new(WorkerPool::new(2, 1));
    let registry = ServiceRegistry::new(bus.clone(), timeout);
    (bus, registry)
}

#[tokio::test]
async fn register_fires_service_registered() {
    let (bus, registry) = registry(Duration::from_secs(1));
    let seen = Arc::new(StdMutex::new(Vec::new()));
    let captured = seen.clone();
    bus.listen(SERVICE_REGISTERED, move |event| {
        let domain = event.data_str(attr::DOMAIN).unwrap().to_string();
        let service = event.data_str(attr::SERVICE).unwrap().to_string();
        captured.lock().unwrap().push((domain, service));
    });

    registry.register("test", "ping", |_| {});
    bus.pool().block_till_done().await;

    assert_eq!(*seen.lock().unwrap(), vec![("test".to_string(), "ping".to_string())]);
    assert!(registry.has_service("test", "ping"));
    assert!(!registry.has_service("test", "missing"));
}

#[tokio::test]
async fn call_blocking_returns_true_for_a_registered_service() {
    let (bus, registry) = registry(Duration::from_secs(1));
    registry.register("test", "ping", |_| {});

    let completed = registry.call_blocking("test", "ping", Map::new()).await;
    assert!(completed);
    bus.pool().block_till_done().await;
}

#[tokio::test]
async fn call_blocking_times_out_for_a_slow_handler() {
    let (_bus, registry) = registry(Duration::from_millis(50));
    registry.register("test", "slow", |_| {
        std::thread::sleep(StdDuration::from_millis(500));
    });

    let completed = registry.call_blocking("test", "slow", Map::new()).await;
    assert!(!completed);
}

#[tokio::test]
async fn call_blocking_for_an_unknown_service_waits_the_full_timeout() {
    let (_bus, registry) = registry(Duration::from_millis(30));
    let completed = registry.call_blocking("nope", "nope", Map::new()).await;
    assert!(!completed);
}

#[tokio::test]
async fn handler_receives_service_call_data_with_reserved_keys_stripped() {
    let (bus, registry) = registry(Duration::from_secs(1));
    let seen: Arc<StdMutex<Option<ServiceCall>>> = Arc::new(StdMutex::new(None));
    let captured = seen.clone();
    registry.register("test", "echo", move |call| {
        *captured.lock().unwrap() = Some(call);
    });

    let mut data = Map::new();
    data.insert("message".to_string(), json!("hi"));
    registry.call("test", "echo", data);
    bus.pool().block_till_done().await;

    let call = seen.lock().unwrap().take().unwrap();
    assert_eq!(call.domain, "test");
    assert_eq!(call.service, "echo");
    assert_eq!(call.data_str("message"), Some("hi"));
    assert!(!call.data.contains_key(attr::DOMAIN));
    assert!(!call.data.contains_key(attr::SERVICE));
}

#[tokio::test]
async fn services_view_lists_registered_names_per_domain() {
    let (bus, registry) = registry(Duration::from_secs(1));
    registry.register("test", "ping", |_| {});
    registry.register("test", "pong", |_| {});
    bus.pool().block_till_done().await;

    let services = registry.services();
    let mut names = services.get("test").cloned().unwrap_or_default();
    names.sort();
    assert_eq!(names, vec!["ping".to_string(), "pong".to_string()]);
}
