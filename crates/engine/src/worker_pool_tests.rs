// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Mutex as StdMutex;
use std::time::Duration as StdDuration;

#[tokio::test]
async fn jobs_run_in_priority_then_fifo_order() {
    let pool = WorkerPool::new(1, 1);
    let order: Arc<StdMutex<Vec<&'static str>>> = Arc::new(StdMutex::new(Vec::new()));

    // Block the single worker first so all three jobs queue up before any run.
    let gate = Arc::new(tokio::sync::Barrier::new(2));
    let gate_job = gate.clone();
    pool.add_job(
        Priority::Default,
        "gate",
        Box::new(move || {
            tokio::runtime::Handle::current().block_on(gate_job.wait());
        }),
    );

    let o1 = order.clone();
    pool.add_job(Priority::Default, "default", Box::new(move || o1.lock().unwrap().push("default")));
    let o2 = order.clone();
    pool.add_job(Priority::State, "state", Box::new(move || o2.lock().unwrap().push("state")));
    let o3 = order.clone();
    pool.add_job(Priority::Callback, "callback", Box::new(move || o3.lock().unwrap().push("callback")));

    gate.wait().await;
    pool.block_till_done().await;

    assert_eq!(*order.lock().unwrap(), vec!["callback", "state", "default"]);
}

#[tokio::test]
async fn block_till_done_tolerates_jobs_enqueued_while_waiting() {
    let pool = WorkerPool::new(2, 1);
    let ran = Arc::new(StdMutex::new(0));
    let pool2 = pool.clone();
    let ran2 = ran.clone();
    pool.add_job(
        Priority::Default,
        "first",
        Box::new(move || {
            *ran2.lock().unwrap() += 1;
            pool2.add_job(Priority::Default, "second", Box::new(|| {}));
        }),
    );
    pool.block_till_done().await;
    assert_eq!(*ran.lock().unwrap(), 1);
    assert_eq!(pool.pending_jobs(), 0);
}

#[tokio::test]
async fn add_worker_grows_capacity() {
    let pool = WorkerPool::new(1, 1);
    assert_eq!(pool.worker_count(), 1);
    pool.add_worker();
    assert_eq!(pool.worker_count(), 2);
}

#[tokio::test]
async fn panicking_job_does_not_kill_the_pool() {
    let pool = WorkerPool::new(1, 1);
    pool.add_job(Priority::Default, "boom", Box::new(|| panic!("boom")));
    pool.block_till_done().await;

    let ran = Arc::new(StdMutex::new(false));
    let ran2 = ran.clone();
    pool.add_job(Priority::Default, "after", Box::new(move || *ran2.lock().unwrap() = true));
    pool.block_till_done().await;
    assert!(*ran.lock().unwrap());
}

#[tokio::test]
async fn busy_callback_fires_once_per_threshold_crossing() {
    let pool = WorkerPool::new(1, 1);
    let fired = Arc::new(StdMutex::new(0));
    let fired2 = fired.clone();
    pool.on_busy(move |_report| *fired2.lock().unwrap() += 1);

    let gate = Arc::new(tokio::sync::Barrier::new(2));
    let gate_job = gate.clone();
    pool.add_job(
        Priority::Default,
        "gate",
        Box::new(move || {
            tokio::runtime::Handle::current().block_on(gate_job.wait());
        }),
    );
    // worker_count=1, factor=1 => threshold is 1; two more pending jobs crosses it.
    pool.add_job(Priority::Default, "a", Box::new(|| {}));
    pool.add_job(Priority::Default, "b", Box::new(|| {}));
    tokio::time::sleep(StdDuration::from_millis(10)).await;
    assert_eq!(*fired.lock().unwrap(), 1);

    gate.wait().await;
    pool.block_till_done().await;
}
