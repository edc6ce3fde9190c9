// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error primitives used by both the broker and engine crates.

use thiserror::Error;

/// A behaviour or evaluator failure wrapped for transport on `run.error`.
///
/// Carries the id of the activity that raised it plus a human-readable
/// cause; the original error is not required to be `'static` so this is
/// the crossing point where it gets flattened to a string.
#[derive(Debug, Clone, Error)]
#[error("activity {source} failed: {inner}")]
pub struct ActivityError {
    pub source: String,
    pub inner: String,
}

impl ActivityError {
    pub fn new(source: impl Into<String>, inner: impl Into<String>) -> Self {
        Self { source: source.into(), inner: inner.into() }
    }
}
