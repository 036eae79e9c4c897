// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_now_secs_is_plausible() {
    let clock = SystemClock;
    let secs = clock.now_secs();
    assert!(secs > 1_600_000_000, "expected a post-2020 timestamp, got {secs}");
}

#[test]
fn fake_clock_starts_at_requested_second() {
    let clock = FakeClock::at(1_000);
    assert_eq!(clock.now_secs(), 1_000);
}

#[test]
fn fake_clock_advances_by_exact_duration() {
    let clock = FakeClock::at(1_000);
    clock.advance(Duration::from_millis(1500));
    assert_eq!(clock.now_secs(), 1_001);
    assert_eq!(clock.now(), Duration::from_millis(1_001_500));
}

#[test]
fn fake_clock_clones_share_state() {
    let clock = FakeClock::at(0);
    let clone = clock.clone();
    clock.advance(Duration::from_secs(5));
    assert_eq!(clone.now_secs(), 5);
}
