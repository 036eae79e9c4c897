// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the kernel's core data types.
//!
//! Only two failure kinds are ever surfaced to callers as `Err` variants.
//! A timed-out blocking call, a failing listener, and an unknown service are
//! all handled entirely inside `automaton-engine` instead: a timed-out
//! blocking call returns `false`, a failing listener is caught and logged,
//! an unknown service is silently dropped.

use thiserror::Error;

/// Errors raised while constructing or validating core kernel data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KernelError {
    /// A `State` was constructed with an entity id that does not match
    /// `<domain>.<object_id>`.
    #[error("invalid entity id {0:?}: expected <domain>.<object_id>")]
    InvalidEntityFormat(String),

    /// An operation that requires an entity id was called without one.
    #[error("no entity specified")]
    NoEntitySpecified,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
