// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ServiceCall`: the argument passed to a registered service handler.

use serde_json::{Map, Value};

/// A single invocation of a registered service. `domain`/`service` identify
/// the handler; `data` is the caller-supplied payload with the reserved
/// `domain`/`service` keys stripped; `service_call_id` correlates this call
/// with its eventual `service-executed` acknowledgement.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    pub service_call_id: String,
    pub data: Map<String, Value>,
}

impl ServiceCall {
    pub fn new(
        domain: impl Into<String>,
        service: impl Into<String>,
        service_call_id: impl Into<String>,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            domain: domain.into(),
            service: service.into(),
            service_call_id: service_call_id.into(),
            data,
        }
    }

    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
