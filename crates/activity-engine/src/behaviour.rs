// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pluggable per-activity behaviour: the external collaborator that turns a
//! `run.execute` message into eventual execution-queue messages. Concrete
//! behaviours (UserTask, ServiceTask, Timer, ...) live outside this crate;
//! this module only defines the contract and the bridge-facing publisher.

use activity_broker::{Broker, PublishOptions};
use activity_core::{Clock, ExecutionId};
use serde_json::Value;

pub const EXECUTION_EXCHANGE: &str = "execution";
pub const EXECUTION_QUEUE: &str = "execution-q";

/// The message handed to a behaviour when a run reaches `executing`.
#[derive(Debug, Clone)]
pub struct ExecuteMessage {
    pub execution_id: ExecutionId,
    pub parent: Option<Value>,
    pub content: Value,
}

/// Thin wrapper so a behaviour can publish onto `execution-q` without
/// holding a reference to the whole broker.
pub struct ExecutionPublisher<'a, C: Clock> {
    broker: &'a mut Broker<C>,
    execution_id: ExecutionId,
}

impl<'a, C: Clock> ExecutionPublisher<'a, C> {
    pub fn new(broker: &'a mut Broker<C>, execution_id: ExecutionId) -> Self {
        Self { broker, execution_id }
    }

    pub fn publish(&mut self, routing_key: &str, content: Value) {
        let envelope = serde_json::json!({
            "executionId": self.execution_id,
            "content": content,
        });
        if let Err(err) =
            self.broker.publish(EXECUTION_EXCHANGE, routing_key, envelope, PublishOptions::default())
        {
            tracing::warn!(routing_key, error = %err, "execution-queue publish failed");
        }
    }

    pub fn completed(&mut self, output: Value) {
        self.publish("execute.completed", output);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.publish("execute.error", serde_json::json!({ "message": message.into() }));
    }

    pub fn discard(&mut self) {
        self.publish("execute.discard", Value::Null);
    }

    /// Emitted as an informational event (`activity.wait`) without
    /// completing the run; see `execution_bridge` for the rationale.
    pub fn wait(&mut self, detail: Value) {
        self.publish("execute.wait", detail);
    }

    /// `outbound` must be a JSON object with an `"outbound"` key holding the
    /// resolved `[[flowId, "Take"|"Discard"], ...]` pairs, so it merges
    /// directly into the run's [`crate::run_content::RunContent`].
    pub fn outbound_take(&mut self, outbound: Value) {
        self.publish("execute.outbound.take", outbound);
    }
}

/// Drives one run's behaviour, parameterized by the activity's clock so it
/// can publish through [`ExecutionPublisher`] without pulling in async
/// machinery.
pub trait Behaviour<C: Clock>: Send {
    /// Called once when the run enters `executing`. Synchronous behaviours
    /// publish immediately; asynchronous ones (user tasks) return without
    /// publishing and wait for an external `signal`/`discard` call.
    fn execute(&mut self, message: &ExecuteMessage, out: &mut ExecutionPublisher<'_, C>);

    /// Called when the activity is asked to discard while this behaviour
    /// is in flight.
    fn discard(&mut self, out: &mut ExecutionPublisher<'_, C>) {
        out.discard();
    }

    fn stop(&mut self) {}
}

#[cfg(test)]
#[path = "behaviour_tests.rs"]
mod tests;
