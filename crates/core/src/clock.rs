// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling.
//!
//! The kernel never calls `SystemTime::now()`/`Instant::now()` directly outside
//! this module; every time-sensitive component takes a `Clock` so tests can
//! drive the Timer and service-call timeouts deterministically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A clock that provides the current wall-clock time.
///
/// `now_secs` returns whole seconds since the Unix epoch, matching the
/// seconds-precision timestamps the kernel stores on `State` and `time-changed`
/// events (see [`crate::state::State`]).
pub trait Clock: Clone + Send + Sync + 'static {
    fn now_secs(&self) -> u64;

    /// Current time as a `Duration` since the Unix epoch (sub-second precision).
    fn now(&self) -> Duration;
}

/// Real wall clock backed by `SystemTime`.
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        self.now().as_secs()
    }

    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// Fake clock for tests: starts at a fixed instant and only moves when told to.
#[derive(Clone)]
pub struct FakeClock {
    micros: Arc<AtomicU64>,
}

impl FakeClock {
    /// Construct a fake clock starting at the given whole-seconds timestamp.
    pub fn at(start_secs: u64) -> Self {
        Self {
            micros: Arc::new(AtomicU64::new(start_secs * 1_000_000)),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        self.micros
            .fetch_add(duration.as_micros() as u64, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::at(1_700_000_000)
    }
}

impl Clock for FakeClock {
    fn now_secs(&self) -> u64 {
        self.now().as_secs()
    }

    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
