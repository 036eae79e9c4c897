// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entity id grammar: `<domain>.<object_id>`, both parts word characters.

use crate::error::KernelError;

/// Validates and lowercases an entity id of the form `<domain>.<object_id>`,
/// where `domain` and `object_id` are both non-empty runs of
/// `[A-Za-z0-9_]`.
pub fn normalize_entity_id(entity_id: &str) -> Result<String, KernelError> {
    let (domain, object_id) = entity_id
        .split_once('.')
        .ok_or_else(|| KernelError::InvalidEntityFormat(entity_id.to_string()))?;

    if !is_word(domain) || !is_word(object_id) || object_id.contains('.') {
        return Err(KernelError::InvalidEntityFormat(entity_id.to_string()));
    }

    Ok(entity_id.to_ascii_lowercase())
}

/// Splits an already-normalized entity id into `(domain, object_id)`.
///
/// Panics if `entity_id` was not produced by [`normalize_entity_id`]; callers
/// inside this crate only ever hold normalized ids.
#[allow(clippy::expect_used)]
pub fn split_entity_id(entity_id: &str) -> (&str, &str) {
    entity_id
        .split_once('.')
        .expect("entity_id must already be validated")
}

fn is_word(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
