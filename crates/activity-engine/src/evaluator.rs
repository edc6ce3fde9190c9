// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound Evaluator: decides which outbound sequence flows are taken or
//! discarded for one leave/completion event.

use crate::error::ActivityError;
use crate::model::SequenceFlowDefinition;
use activity_core::{EvaluationId, FlowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowAction {
    Take,
    Discard,
}

#[derive(Debug, Clone)]
pub struct OutboundResult {
    pub id: FlowId,
    pub action: FlowAction,
    pub is_default: bool,
    pub evaluation_id: EvaluationId,
    pub message: Option<Value>,
}

/// Reorders so the default flow (if any) sorts last, preserving the
/// relative order of every other flow.
fn order_with_default_last(flows: &[SequenceFlowDefinition]) -> Vec<&SequenceFlowDefinition> {
    let mut ordered: Vec<&SequenceFlowDefinition> = flows.iter().filter(|f| !f.is_default).collect();
    ordered.extend(flows.iter().filter(|f| f.is_default));
    ordered
}

/// Evaluate all outbound flows against `source_message`.
///
/// `discard_rest_at_take` is the exclusive-gateway semantic: once one flow
/// is taken, every remaining flow is discarded without evaluation.
pub fn evaluate(
    flows: &[SequenceFlowDefinition],
    source_message: &Value,
    discard_rest_at_take: bool,
) -> Result<Vec<OutboundResult>, ActivityError> {
    let ordered = order_with_default_last(flows);
    let mut results: Vec<OutboundResult> = Vec::with_capacity(ordered.len());
    let mut took_one = false;
    let mut idx = 0;

    while idx < ordered.len() {
        let flow = ordered[idx];
        let action = if flow.is_default {
            FlowAction::Take
        } else {
            match flow.condition.as_ref() {
                None => FlowAction::Take,
                Some(cond) if cond.evaluate(source_message)? => FlowAction::Take,
                Some(_) => FlowAction::Discard,
            }
        };

        results.push(OutboundResult {
            id: flow.id,
            action,
            is_default: flow.is_default,
            evaluation_id: EvaluationId::new(),
            message: if action == FlowAction::Take { Some(source_message.clone()) } else { None },
        });
        idx += 1;

        if action == FlowAction::Take {
            took_one = true;
            if discard_rest_at_take {
                for flow in &ordered[idx..] {
                    results.push(discard(flow));
                }
                break;
            }
            if let Some(next) = ordered.get(idx) {
                if next.is_default {
                    results.push(discard(next));
                    break;
                }
            }
        }
    }

    if !ordered.is_empty() && !took_one {
        return Err(ActivityError::new(
            "outbound-evaluator",
            "no conditional flow taken",
        ));
    }

    // Restore original declaration order for the result set.
    results.sort_by_key(|r| flows.iter().position(|f| f.id == r.id).unwrap_or(usize::MAX));
    Ok(results)
}

fn discard(flow: &SequenceFlowDefinition) -> OutboundResult {
    OutboundResult {
        id: flow.id,
        action: FlowAction::Discard,
        is_default: flow.is_default,
        evaluation_id: EvaluationId::new(),
        message: None,
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
