// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Execution-queue bridge: translates behaviour-published `execute.*`
//! messages back into run-queue transitions.

use serde_json::Value;

/// What the bridge decided to do with one execution-queue delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeOutcome {
    /// Resolve outbound with the carried hints, publish
    /// `run.execute.passthrough`, ack the original `run.execute`.
    OutboundTake(Value),
    /// Status `error`; publish `run.error` then `run.discarded`.
    Error(String),
    /// Status `discarded`; publish `run.discarded`.
    Discard,
    /// Republished as `event activity.wait` only; the run stays in
    /// `executing` and no transition happens. Not part of the literal
    /// "anything else completes" reading, see DESIGN.md for the rationale.
    Waiting(Value),
    /// Status `executed`; publish `run.end`.
    Completed(Value),
}

/// Classify one execution-queue message by its routing key.
pub fn classify(routing_key: &str, content: Value) -> BridgeOutcome {
    match routing_key {
        "execute.outbound.take" => BridgeOutcome::OutboundTake(content),
        "execute.error" => {
            let message = content
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("behaviour error")
                .to_string();
            BridgeOutcome::Error(message)
        }
        "execute.discard" => BridgeOutcome::Discard,
        "execute.wait" => BridgeOutcome::Waiting(content),
        // Includes "execute.completed" and any behaviour-specific routing
        // key not handled above: per spec, anything else completes the run.
        _ => BridgeOutcome::Completed(content),
    }
}

/// The externally-observable event name for a routing key, republished on
/// the `event` exchange as `activity.<name>` before the bridge acts.
pub fn event_name_for(routing_key: &str) -> &str {
    routing_key.strip_prefix("execute.").unwrap_or(routing_key)
}

/// Merge the original `run.execute` content with the execution message's
/// content, re-injecting `executionId` and `parent` from the original so a
/// behaviour cannot accidentally clobber them.
pub fn merge_content(original: &Value, execution_content: &Value) -> Value {
    let mut merged = original.clone();
    if let (Some(merged_obj), Some(exec_obj)) = (merged.as_object_mut(), execution_content.as_object()) {
        for (k, v) in exec_obj {
            merged_obj.insert(k.clone(), v.clone());
        }
        if let Some(execution_id) = original.get("executionId") {
            merged_obj.insert("executionId".to_string(), execution_id.clone());
        }
        if let Some(parent) = original.get("parent") {
            merged_obj.insert("parent".to_string(), parent.clone());
        }
    }
    merged
}

#[cfg(test)]
#[path = "execution_bridge_tests.rs"]
mod tests;
