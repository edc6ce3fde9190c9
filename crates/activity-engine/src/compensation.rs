// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compensation: an activity with `is_for_compensation` listens on inbound
//! associations instead of sequence flows and is not activated by default.

use activity_core::ActivityId;

/// Make a routing-key-safe id segment out of a raw identifier by replacing
/// characters outside `[A-Za-z0-9_-]` with `_`.
pub fn broker_safe_id(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// The deterministic compensation id published with `compensation.start`
/// and `compensation.end`, so an observer can correlate the pair.
pub fn compensation_id(activity_id: &ActivityId, sequence_id: &str) -> String {
    format!("{}_{}", broker_safe_id(activity_id.as_str()), broker_safe_id(sequence_id))
}

#[cfg(test)]
#[path = "compensation_tests.rs"]
mod tests;
