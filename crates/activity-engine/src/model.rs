// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Static activity definition and the small value types shared across the
//! state machine, evaluator, and dispatch modules.

use activity_core::{simple_display, ActivityId, ExecutionId, FlowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// A condition attached to a sequence flow. Expression evaluation itself is
/// an external collaborator's concern; this crate only calls it.
pub trait Condition: Send + Sync {
    fn evaluate(&self, message: &Value) -> Result<bool, crate::error::ActivityError>;
}

impl<F> Condition for F
where
    F: Fn(&Value) -> Result<bool, crate::error::ActivityError> + Send + Sync,
{
    fn evaluate(&self, message: &Value) -> Result<bool, crate::error::ActivityError> {
        (self)(message)
    }
}

/// Static definition of one outbound sequence flow.
#[derive(Clone)]
pub struct SequenceFlowDefinition {
    pub id: FlowId,
    pub target: ActivityId,
    pub is_default: bool,
    pub condition: Option<Arc<dyn Condition>>,
}

impl std::fmt::Debug for SequenceFlowDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceFlowDefinition")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("is_default", &self.is_default)
            .field("has_condition", &self.condition.is_some())
            .finish()
    }
}

/// What triggered this activity to consider running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    SequenceFlow,
    /// The activity this one is attached to, for boundary events.
    AttachedTo,
    Association,
}

/// Static flags computed once when the activity is constructed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityFlags {
    pub is_end: bool,
    pub is_start: bool,
    pub is_sub_process: bool,
    pub is_multi_instance: bool,
    pub is_transaction: bool,
    pub is_throwing: bool,
    pub is_for_compensation: bool,
    pub is_parallel_join: bool,
}

impl ActivityFlags {
    /// Derive flags from the activity's wiring: the number of inbound
    /// sequence flows and associations, the number of outbound flows,
    /// whether it is a boundary event, and definition-declared properties.
    pub fn compute(
        inbound_flow_count: usize,
        inbound_association_count: usize,
        outbound_flow_count: usize,
        attached_to: Option<ActivityId>,
        is_parallel_gateway: bool,
        declared: DeclaredProperties,
    ) -> Self {
        Self {
            is_end: outbound_flow_count == 0,
            is_start: inbound_flow_count == 0
                && attached_to.is_none()
                && !declared.is_for_compensation
                && !declared.is_triggered_by_event,
            is_sub_process: declared.is_sub_process,
            is_multi_instance: declared.is_multi_instance,
            is_transaction: declared.is_transaction,
            is_throwing: declared.is_throwing,
            is_for_compensation: declared.is_for_compensation,
            is_parallel_join: is_parallel_gateway && inbound_flow_count >= 2,
        }
        .with_association_hint(inbound_association_count)
    }

    fn with_association_hint(self, _inbound_association_count: usize) -> Self {
        self
    }
}

/// Definition-level properties that can't be inferred from wiring alone;
/// supplied by the surrounding `Context` (out of scope for this crate).
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclaredProperties {
    pub is_sub_process: bool,
    pub is_multi_instance: bool,
    pub is_transaction: bool,
    pub is_throwing: bool,
    pub is_for_compensation: bool,
    pub is_triggered_by_event: bool,
}

/// The activity's run-level status. `None` means not currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Entered,
    Started,
    Executing,
    Executed,
    Error,
    Discarded,
    End,
    /// Pseudo-status while the formatter hook is running.
    Formatting,
    /// Pseudo-status while purging and replaying the discard path.
    Discard,
}

simple_display! {
    Status {
        Entered => "entered",
        Started => "started",
        Executing => "executing",
        Executed => "executed",
        Error => "error",
        Discarded => "discarded",
        End => "end",
        Formatting => "formatting",
        Discard => "discard",
    }
}

/// Monotone per-activity counters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Counters {
    pub taken: u64,
    pub discarded: u64,
}

/// The identity of the currently (or most recently) running execution.
#[derive(Debug, Clone, Default)]
pub struct ExecutionState {
    pub init_execution_id: Option<ExecutionId>,
    pub execution_id: Option<ExecutionId>,
}

impl ExecutionState {
    pub fn start_new(&mut self) -> ExecutionId {
        let id = ExecutionId::new();
        if self.init_execution_id.is_none() {
            self.init_execution_id = Some(id);
        }
        self.execution_id = Some(id);
        id
    }

    pub fn clear(&mut self) {
        self.execution_id = None;
    }
}
