// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Priority-ordered, bounded-concurrency job executor.
//!
//! Jobs are ordinary blocking closures; the pool runs up to `worker_count` of
//! them at a time via [`tokio::task::spawn_blocking`], gated by a
//! [`Semaphore`] sized to the worker count. A single dispatcher task pops the
//! highest-priority job once a permit is free, preserving FIFO order among
//! jobs of equal priority via a monotonic sequence number.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use automaton_core::Priority;
use parking_lot::Mutex;
use tokio::sync::{Notify, Semaphore};

/// A unit of work handed to the pool. Always run on a blocking thread.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// A callback invoked when pending work sustains saturation. Implementers
/// may wire this to metrics rather than logs.
pub type BusyCallback = Box<dyn Fn(BusyReport) + Send + Sync + 'static>;

/// Snapshot handed to a [`BusyCallback`] on a threshold crossing.
#[derive(Debug, Clone)]
pub struct BusyReport {
    pub worker_count: usize,
    pub pending_jobs: usize,
    pub executing: Vec<(String, Duration)>,
}

struct QueuedJob {
    priority: Priority,
    sequence: u64,
    descriptor: String,
    job: Job,
}

impl PartialEq for QueuedJob {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for QueuedJob {}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedJob {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then(self.sequence.cmp(&other.sequence))
    }
}

struct Executing {
    sequence: u64,
    descriptor: String,
    started: Instant,
}

struct Inner {
    queue: Mutex<BinaryHeap<Reverse<QueuedJob>>>,
    executing: Mutex<Vec<Executing>>,
    next_sequence: AtomicU64,
    semaphore: Arc<Semaphore>,
    worker_count: AtomicUsize,
    running: AtomicUsize,
    stopped: AtomicBool,
    has_work: Notify,
    idle: Notify,
    busy_threshold_factor: usize,
    busy_warned: AtomicBool,
    busy_callback: Mutex<Option<BusyCallback>>,
}

/// A bounded-concurrency, priority-ordered job executor.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<Inner>,
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("worker_count", &self.worker_count())
            .field("pending_jobs", &self.pending_jobs())
            .finish()
    }
}

impl WorkerPool {
    /// `busy_threshold_factor` is the `K` in `pending_jobs > worker_count * K`.
    pub fn new(worker_count: usize, busy_threshold_factor: usize) -> Self {
        let inner = Arc::new(Inner {
            queue: Mutex::new(BinaryHeap::new()),
            executing: Mutex::new(Vec::new()),
            next_sequence: AtomicU64::new(0),
            semaphore: Arc::new(Semaphore::new(worker_count)),
            worker_count: AtomicUsize::new(worker_count),
            running: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
            has_work: Notify::new(),
            idle: Notify::new(),
            busy_threshold_factor,
            busy_warned: AtomicBool::new(false),
            busy_callback: Mutex::new(None),
        });
        tokio::spawn(dispatch_loop(inner.clone()));
        Self { inner }
    }

    pub fn worker_count(&self) -> usize {
        self.inner.worker_count.load(AtomicOrdering::Acquire)
    }

    pub fn pending_jobs(&self) -> usize {
        self.inner.queue.lock().len()
    }

    pub fn on_busy(&self, callback: impl Fn(BusyReport) + Send + Sync + 'static) {
        *self.inner.busy_callback.lock() = Some(Box::new(callback));
    }

    /// Enqueues `job` under `priority`. Non-blocking; safe to call from any
    /// thread, including a worker executing another job.
    pub fn add_job(&self, priority: Priority, descriptor: impl Into<String>, job: Job) {
        let sequence = self.inner.next_sequence.fetch_add(1, AtomicOrdering::Relaxed);
        self.inner.queue.lock().push(Reverse(QueuedJob {
            priority,
            sequence,
            descriptor: descriptor.into(),
            job,
        }));
        self.inner.has_work.notify_one();
        maybe_warn_busy(&self.inner);
    }

    /// Grows the pool by one permit, for components that declare additional
    /// demand at startup.
    pub fn add_worker(&self) {
        self.inner.semaphore.add_permits(1);
        self.inner.worker_count.fetch_add(1, AtomicOrdering::AcqRel);
    }

    /// Returns once the queue is empty and no worker is executing a job.
    /// Tolerates jobs enqueued while waiting.
    pub async fn block_till_done(&self) {
        loop {
            let idle = self.inner.idle.notified();
            tokio::pin!(idle);
            // Register as a waiter before checking the condition, so a
            // `notify_waiters` racing with this check is never lost.
            idle.as_mut().enable();
            if self.is_idle() {
                return;
            }
            idle.await;
        }
    }

    /// Signals the dispatcher to exit once the queue drains. Idempotent.
    pub fn stop(&self) {
        self.inner.stopped.store(true, AtomicOrdering::Release);
        self.inner.has_work.notify_waiters();
    }

    fn is_idle(&self) -> bool {
        // Hold the queue lock across both checks: `dispatch_loop` increments
        // `running` under this same lock while popping, so the two can never
        // interleave to make an in-flight job look idle.
        let queue = self.inner.queue.lock();
        queue.is_empty() && self.inner.running.load(AtomicOrdering::Acquire) == 0
    }
}

fn maybe_warn_busy(inner: &Arc<Inner>) {
    let worker_count = inner.worker_count.load(AtomicOrdering::Acquire).max(1);
    let pending = inner.queue.lock().len();
    let threshold = worker_count * inner.busy_threshold_factor.max(1);
    let over = pending > threshold;
    let was_warned = inner.busy_warned.swap(over, AtomicOrdering::AcqRel);
    if over && !was_warned {
        if let Some(callback) = inner.busy_callback.lock().as_ref() {
            let executing = inner
                .executing
                .lock()
                .iter()
                .map(|e| (e.descriptor.clone(), e.started.elapsed()))
                .collect();
            callback(BusyReport {
                worker_count,
                pending_jobs: pending,
                executing,
            });
        }
        tracing::warn!(worker_count, pending, "worker pool under sustained load");
    }
}

async fn dispatch_loop(inner: Arc<Inner>) {
    loop {
        let has_work = inner.has_work.notified();
        let (empty, stopped) = {
            let queue = inner.queue.lock();
            (queue.is_empty(), inner.stopped.load(AtomicOrdering::Acquire))
        };
        if empty {
            if stopped {
                return;
            }
            has_work.await;
            continue;
        }

        let permit = match inner.semaphore.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };

        // Pop and count the job as running under the same queue-lock
        // critical section, so `is_idle` never observes an empty queue and
        // a zero running count while this job is in flight between the two.
        let queued = {
            let mut queue = inner.queue.lock();
            let Some(Reverse(queued)) = queue.pop() else {
                drop(queue);
                drop(permit);
                continue;
            };
            inner.running.fetch_add(1, AtomicOrdering::AcqRel);
            queued
        };
        maybe_warn_busy(&inner);
        let sequence = queued.sequence;
        inner.executing.lock().push(Executing {
            sequence,
            descriptor: queued.descriptor.clone(),
            started: Instant::now(),
        });
        let descriptor = queued.descriptor;
        let job = queued.job;
        let inner_for_task = inner.clone();
        tokio::spawn(async move {
            let result = tokio::task::spawn_blocking(job).await;
            if let Err(join_error) = result {
                tracing::error!(descriptor = %descriptor, error = %join_error, "job panicked");
            }
            inner_for_task.executing.lock().retain(|e| e.sequence != sequence);
            inner_for_task.running.fetch_sub(1, AtomicOrdering::AcqRel);
            drop(permit);
            inner_for_task.idle.notify_waiters();
        });
    }
}

#[cfg(test)]
#[path = "worker_pool_tests.rs"]
mod tests;
