// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn data_str_reads_string_fields_and_ignores_missing() {
    let mut data = Map::new();
    data.insert("message".to_string(), json!("hello"));
    let call = ServiceCall::new("notify", "send", "1-1", data);
    assert_eq!(call.data_str("message"), Some("hello"));
    assert_eq!(call.data_str("missing"), None);
}

#[test]
fn equality_compares_all_fields() {
    let a = ServiceCall::new("notify", "send", "1-1", Map::new());
    let b = ServiceCall::new("notify", "send", "1-1", Map::new());
    let c = ServiceCall::new("notify", "send", "1-2", Map::new());
    assert_eq!(a, b);
    assert_ne!(a, c);
}
