// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run leave & outbound dispatch: decides, for one completed run, what to
//! publish on each outbound sequence flow.

use crate::error::ActivityError;
use crate::evaluator::{self, FlowAction, OutboundResult};
use crate::model::SequenceFlowDefinition;
use activity_core::FlowId;
use serde_json::Value;

/// Inputs gathered by the state machine when a run reaches `end`/`discarded`.
pub struct LeaveContext<'a> {
    pub flows: &'a [SequenceFlowDefinition],
    pub is_discarded: bool,
    pub is_boundary_event: bool,
    pub ignore_outbound: bool,
    pub outbound_take_one: bool,
    /// Precomputed outbound actions carried on the inbound message, if any
    /// (adopted as-is instead of re-evaluating).
    pub precomputed: Option<Vec<(FlowId, FlowAction)>>,
    pub discard_sequence: Option<Vec<FlowId>>,
    pub first_inbound: Option<FlowId>,
    pub source_message: Value,
}

pub enum LeavePlan {
    /// No outbound evaluation needed; publish `run.leave` directly.
    LeaveImmediately,
    /// Publish `run.outbound.<action>` for each entry, then `run.leave`.
    Dispatch(Vec<OutboundResult>),
}

pub fn plan_leave(ctx: LeaveContext<'_>) -> Result<LeavePlan, ActivityError> {
    if ctx.ignore_outbound || ctx.flows.is_empty() {
        return Ok(LeavePlan::LeaveImmediately);
    }

    if ctx.is_discarded {
        let mut discard_sequence = ctx.discard_sequence.unwrap_or_default();
        if ctx.is_boundary_event && discard_sequence.is_empty() {
            if let Some(first) = ctx.first_inbound {
                discard_sequence.push(first);
            }
        }
        let results = ctx
            .flows
            .iter()
            .map(|f| OutboundResult {
                id: f.id,
                action: FlowAction::Discard,
                is_default: f.is_default,
                evaluation_id: activity_core::EvaluationId::new(),
                message: None,
            })
            .collect();
        return Ok(LeavePlan::Dispatch(results));
    }

    if let Some(precomputed) = ctx.precomputed {
        let results = ctx
            .flows
            .iter()
            .map(|f| {
                let action = precomputed
                    .iter()
                    .find(|(id, _)| *id == f.id)
                    .map(|(_, a)| *a)
                    .unwrap_or(FlowAction::Discard);
                OutboundResult {
                    id: f.id,
                    action,
                    is_default: f.is_default,
                    evaluation_id: activity_core::EvaluationId::new(),
                    message: if action == FlowAction::Take { Some(ctx.source_message.clone()) } else { None },
                }
            })
            .collect();
        return Ok(LeavePlan::Dispatch(results));
    }

    let results = evaluator::evaluate(ctx.flows, &ctx.source_message, ctx.outbound_take_one)?;
    Ok(LeavePlan::Dispatch(results))
}

/// Derive the per-flow sequence id used on `run.outbound.<action>` messages.
pub fn sequence_id_for(flow_id: &FlowId, action: FlowAction) -> String {
    let verb = match action {
        FlowAction::Take => "take",
        FlowAction::Discard => "discard",
    };
    format!("{}_{}", flow_id.as_str(), verb)
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
