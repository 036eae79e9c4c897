// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kernel tuning knobs: the ambient config layer sitting above the kernel's
//! core subsystems.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a [`crate::kernel::Kernel`]. `Default` reproduces the
/// documented defaults: a 2-worker floor, a busy-pool threshold factor of 1x
/// the worker count, a 1-second timer interval, and a 10s service-call
/// timeout.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Worker threads started with the pool. `WorkerPool::add_worker` may
    /// grow this at runtime for components that declare additional demand.
    pub min_workers: usize,
    /// `K` in `pending_jobs > worker_count * K` for the busy-pool callback.
    pub busy_threshold_factor: usize,
    /// `Timer` tick interval. Must evenly divide 60 seconds.
    pub timer_interval: Duration,
    /// Bound on `ServiceRegistry::call_blocking`'s wait for completion.
    pub service_call_timeout: Duration,
    /// Directory higher layers may use for component configuration. The
    /// kernel itself never reads or writes it (no persistence is a
    /// non-goal).
    pub config_dir: PathBuf,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            min_workers: 2,
            busy_threshold_factor: 1,
            timer_interval: Duration::from_secs(1),
            service_call_timeout: Duration::from_secs(10),
            config_dir: PathBuf::from("."),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
