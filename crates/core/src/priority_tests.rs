// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::event::{CALL_SERVICE, SERVICE_EXECUTED, STATE_CHANGED, TIME_CHANGED};

#[test]
fn callback_outranks_everything_else() {
    assert!(Priority::Callback < Priority::Service);
    assert!(Priority::Service < Priority::State);
    assert!(Priority::State < Priority::Time);
    assert!(Priority::Time < Priority::Default);
}

#[test]
fn maps_known_event_types_to_their_band() {
    assert_eq!(
        Priority::for_event_type(&SERVICE_EXECUTED.into()),
        Priority::Callback
    );
    assert_eq!(Priority::for_event_type(&CALL_SERVICE.into()), Priority::Service);
    assert_eq!(Priority::for_event_type(&STATE_CHANGED.into()), Priority::State);
    assert_eq!(Priority::for_event_type(&TIME_CHANGED.into()), Priority::Time);
}

#[test]
fn unknown_event_types_fall_back_to_default() {
    assert_eq!(Priority::for_event_type(&"custom_event".into()), Priority::Default);
}

#[test]
fn displays_as_lowercase_band_name() {
    assert_eq!(Priority::Callback.to_string(), "callback");
    assert_eq!(Priority::Default.to_string(), "default");
}
