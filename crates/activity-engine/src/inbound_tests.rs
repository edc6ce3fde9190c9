// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

fn msg(source: &str, taken: bool, discard: &[&str]) -> InboundMessage {
    InboundMessage {
        source: FlowId::from_string(source),
        taken,
        discard_sequence: discard.iter().map(|s| FlowId::from_string(*s)).collect(),
        content: json!({}),
    }
}

#[test]
fn waits_until_every_trigger_arrives() {
    let mut buffer = JoinBuffer::new(2);
    assert!(buffer.arrive(msg("a", true, &[])).is_none());
    assert_eq!(buffer.pending_count(), 1);
    assert!(buffer.arrive(msg("b", true, &[])).is_some());
}

#[test]
fn duplicate_source_is_ignored() {
    let mut buffer = JoinBuffer::new(2);
    assert!(buffer.arrive(msg("a", true, &[])).is_none());
    assert!(buffer.arrive(msg("a", true, &[])).is_none());
    assert_eq!(buffer.pending_count(), 1);
}

#[test]
fn any_take_runs_with_full_buffer() {
    let mut buffer = JoinBuffer::new(2);
    buffer.arrive(msg("a", false, &["a"]));
    let decision = buffer.arrive(msg("b", true, &[])).unwrap();
    match decision {
        JoinDecision::Run(messages) => assert_eq!(messages.len(), 2),
        JoinDecision::RunDiscard(_) => panic!("expected Run"),
    }
}

#[test]
fn all_discard_merges_discard_sequences_in_order_without_duplicates() {
    let mut buffer = JoinBuffer::new(2);
    buffer.arrive(msg("a", false, &["x", "y"]));
    let decision = buffer.arrive(msg("b", false, &["y", "z"])).unwrap();
    match decision {
        JoinDecision::RunDiscard(seq) => {
            let ids: Vec<&str> = seq.iter().map(|f| f.as_str()).collect();
            assert_eq!(ids, vec!["x", "y", "z"]);
        }
        JoinDecision::Run(_) => panic!("expected RunDiscard"),
    }
}

#[test]
fn buffer_is_cleared_after_dispatch() {
    let mut buffer = JoinBuffer::new(1);
    buffer.arrive(msg("a", true, &[]));
    assert_eq!(buffer.pending_count(), 0);
}
