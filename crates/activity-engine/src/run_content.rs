// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed content carried on `run.*` messages.

use crate::evaluator::FlowAction;
use activity_core::{ExecutionId, FlowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunContent {
    pub execution_id: Option<ExecutionId>,
    #[serde(default)]
    pub ignore_outbound: bool,
    #[serde(default)]
    pub outbound_take_one: bool,
    #[serde(default)]
    pub outbound: Option<Vec<(FlowId, FlowAction)>>,
    #[serde(default)]
    pub discard_sequence: Option<Vec<FlowId>>,
    #[serde(default)]
    pub is_discarded: bool,
    /// Set when a behaviour or the outbound evaluator failed; carried
    /// through `run.error` so `event activity.error` reports the cause.
    #[serde(default)]
    pub error: Option<String>,
    /// Arbitrary behaviour-owned payload (e.g. a signalled user task's
    /// output, or an inclusive gateway's evaluated message).
    #[serde(default)]
    pub payload: Value,
}

impl RunContent {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}
