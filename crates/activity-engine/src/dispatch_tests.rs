// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use activity_core::ActivityId;
use serde_json::json;

fn flow(id: &str, is_default: bool) -> SequenceFlowDefinition {
    SequenceFlowDefinition { id: FlowId::from_string(id), target: ActivityId::new(), is_default, condition: None }
}

#[test]
fn ignore_outbound_skips_evaluation() {
    let flows = vec![flow("f1", false)];
    let plan = plan_leave(LeaveContext {
        flows: &flows,
        is_discarded: false,
        is_boundary_event: false,
        ignore_outbound: true,
        outbound_take_one: false,
        precomputed: None,
        discard_sequence: None,
        first_inbound: None,
        source_message: json!({}),
    })
    .unwrap();
    assert!(matches!(plan, LeavePlan::LeaveImmediately));
}

#[test]
fn no_outbound_flows_leaves_immediately() {
    let plan = plan_leave(LeaveContext {
        flows: &[],
        is_discarded: false,
        is_boundary_event: false,
        ignore_outbound: false,
        outbound_take_one: false,
        precomputed: None,
        discard_sequence: None,
        first_inbound: None,
        source_message: json!({}),
    })
    .unwrap();
    assert!(matches!(plan, LeavePlan::LeaveImmediately));
}

#[test]
fn discarded_run_discards_every_outbound() {
    let flows = vec![flow("f1", false), flow("f2", false)];
    let plan = plan_leave(LeaveContext {
        flows: &flows,
        is_discarded: true,
        is_boundary_event: false,
        ignore_outbound: false,
        outbound_take_one: false,
        precomputed: None,
        discard_sequence: None,
        first_inbound: None,
        source_message: json!({}),
    })
    .unwrap();
    match plan {
        LeavePlan::Dispatch(results) => assert!(results.iter().all(|r| r.action == FlowAction::Discard)),
        _ => panic!("expected dispatch"),
    }
}

#[test]
fn boundary_event_discard_seeds_sequence_with_first_inbound() {
    let flows = vec![flow("f1", false)];
    let first = FlowId::from_string("inbound-1");
    let plan = plan_leave(LeaveContext {
        flows: &flows,
        is_discarded: true,
        is_boundary_event: true,
        ignore_outbound: false,
        outbound_take_one: false,
        precomputed: None,
        discard_sequence: None,
        first_inbound: Some(first),
        source_message: json!({}),
    })
    .unwrap();
    assert!(matches!(plan, LeavePlan::Dispatch(_)));
}

#[test]
fn precomputed_outbound_is_adopted_without_reevaluation() {
    let flows = vec![flow("f1", false), flow("f2", false)];
    let plan = plan_leave(LeaveContext {
        flows: &flows,
        is_discarded: false,
        is_boundary_event: false,
        ignore_outbound: false,
        outbound_take_one: false,
        precomputed: Some(vec![(FlowId::from_string("f1"), FlowAction::Take)]),
        discard_sequence: None,
        first_inbound: None,
        source_message: json!({}),
    })
    .unwrap();
    match plan {
        LeavePlan::Dispatch(results) => {
            assert_eq!(results.iter().find(|r| r.id.as_str() == "f1").unwrap().action, FlowAction::Take);
            assert_eq!(results.iter().find(|r| r.id.as_str() == "f2").unwrap().action, FlowAction::Discard);
        }
        _ => panic!("expected dispatch"),
    }
}

#[test]
fn sequence_id_encodes_flow_and_action() {
    let id = FlowId::from_string("flw-abc");
    assert_eq!(sequence_id_for(&id, FlowAction::Take), "flw-abc_take");
    assert_eq!(sequence_id_for(&id, FlowAction::Discard), "flw-abc_discard");
}
