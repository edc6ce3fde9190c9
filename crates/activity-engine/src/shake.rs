// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shake: a read-only traversal of outbound flows, used to build the
//! reachable flow graph from one activity without executing anything.

use activity_core::ActivityId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShakeStep {
    pub id: ActivityId,
    #[serde(rename = "type")]
    pub activity_type: String,
}

/// Append this activity's step to the shake trail and decide whether to
/// stop (end activities) or continue propagating to every outbound flow.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShakeTrail {
    pub sequence: Vec<ShakeStep>,
}

impl ShakeTrail {
    pub fn visit(&mut self, id: ActivityId, activity_type: impl Into<String>) {
        self.sequence.push(ShakeStep { id, activity_type: activity_type.into() });
    }
}

#[cfg(test)]
#[path = "shake_tests.rs"]
mod tests;
