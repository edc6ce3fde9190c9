// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete opaque ID types shared across the activity runtime.

use crate::define_id;

define_id! {
    /// Identifies one activity instance within a process.
    pub struct ActivityId("act-");
}

define_id! {
    /// Identifies a sequence flow edge between two activities.
    pub struct FlowId("flw-");
}

define_id! {
    /// Identifies a single run of an activity's behaviour; stable from
    /// `run.enter` to `run.leave`, fresh on every new run.
    pub struct ExecutionId("exe-");
}

define_id! {
    /// Identifies a broker consumer registration.
    pub struct ConsumerTag("ctg-");
}

define_id! {
    /// Identifies a single message published on the broker.
    pub struct MessageId("msg-");
}

define_id! {
    /// Identifies one outbound-evaluator pass over a run's flows.
    pub struct EvaluationId("evl-");
}

define_id! {
    /// Identifies one outbound dispatch of a single sequence flow
    /// (`{flowId}_{action}` derived, see activity-engine::dispatch).
    pub struct SequenceId("seq-");
}
