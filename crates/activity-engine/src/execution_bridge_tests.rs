// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[yare::parameterized(
    outbound_take = { "execute.outbound.take", json!({"a": 1}) },
    discard       = { "execute.discard", json!(null) },
    wait          = { "execute.wait", json!({"reason": "pending"}) },
    completed     = { "execute.completed", json!({"output": 1}) },
    custom_key    = { "execute.signal", json!({"data": 1}) },
)]
fn classify_matches_expected_variant(routing_key: &str, content: Value) {
    let outcome = classify(routing_key, content.clone());
    match routing_key {
        "execute.outbound.take" => assert_eq!(outcome, BridgeOutcome::OutboundTake(content)),
        "execute.discard" => assert_eq!(outcome, BridgeOutcome::Discard),
        "execute.wait" => assert_eq!(outcome, BridgeOutcome::Waiting(content)),
        _ => assert_eq!(outcome, BridgeOutcome::Completed(content)),
    }
}

#[test]
fn error_extracts_message_field() {
    let outcome = classify("execute.error", json!({"message": "boom"}));
    assert_eq!(outcome, BridgeOutcome::Error("boom".to_string()));
}

#[test]
fn error_falls_back_when_message_missing() {
    let outcome = classify("execute.error", json!({}));
    assert_eq!(outcome, BridgeOutcome::Error("behaviour error".to_string()));
}

#[test]
fn event_name_strips_execute_prefix() {
    assert_eq!(event_name_for("execute.wait"), "wait");
    assert_eq!(event_name_for("execute.outbound.take"), "outbound.take");
}

#[test]
fn merge_content_reinjects_execution_id_and_parent_from_original() {
    let original = json!({"executionId": "exe-1", "parent": {"id": "act-1"}, "foo": "orig"});
    let execution_content = json!({"foo": "new", "bar": 2});
    let merged = merge_content(&original, &execution_content);
    assert_eq!(merged["executionId"], json!("exe-1"));
    assert_eq!(merged["parent"], json!({"id": "act-1"}));
    assert_eq!(merged["foo"], json!("new"));
    assert_eq!(merged["bar"], json!(2));
}
