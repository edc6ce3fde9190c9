// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Activity State Machine: the central component tying the broker,
//! evaluator, inbound join buffer, formatter/extensions, and behaviour
//! together into the `enter → start → execute → end → leave` lifecycle.

use crate::behaviour::{Behaviour, ExecuteMessage, ExecutionPublisher, EXECUTION_EXCHANGE, EXECUTION_QUEUE};
use crate::compensation;
use crate::config::EngineOptions;
use crate::dispatch::{self, LeaveContext, LeavePlan};
use crate::error::EngineError;
use crate::events;
use crate::execution_bridge::{self, BridgeOutcome};
use crate::formatter::{FormatOutcome, Formatter};
use crate::inbound::{InboundMessage, JoinBuffer, JoinDecision};
use crate::model::{ActivityFlags, Counters, ExecutionState, SequenceFlowDefinition, Status};
use crate::run_content::RunContent;
use activity_broker::{Broker, BrokerSnapshot, ConsumeOptions, ExchangeKind, Message, PublishOptions, QueueOptions};
use activity_core::{ActivityId, Clock, ConsumerTag, FlowId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RUN_EXCHANGE: &str = "run";
pub const API_EXCHANGE: &str = "api";
pub const FORMAT_EXCHANGE: &str = "format-run";

pub const INBOUND_QUEUE: &str = "inbound-q";
pub const RUN_QUEUE: &str = "run-q";
pub const FORMAT_QUEUE: &str = "format-run-q";

const RUN_CONSUMER_TAG: &str = "_activity-run";
const INBOUND_CONSUMER_TAG: &str = "_run-on-inbound";
const EXECUTION_CONSUMER_TAG: &str = "_activity-execution";

/// Serializable point-in-time copy of one activity's mutable state,
/// returned by [`Activity::get_state`] and consumed by [`Activity::recover`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    pub id: ActivityId,
    pub activity_type: String,
    pub status: Option<Status>,
    pub stopped: bool,
    pub counters: Counters,
    pub execution_id: Option<activity_core::ExecutionId>,
    pub broker: BrokerSnapshot,
}

/// One activity instance: identity, static flags, run-time counters, its
/// own broker, and the pluggable behaviour/formatter/extension it drives.
pub struct Activity<C: Clock> {
    pub id: ActivityId,
    pub activity_type: String,
    broker: Broker<C>,
    flags: ActivityFlags,
    counters: Counters,
    status: Option<Status>,
    stopped: bool,
    execution_state: ExecutionState,
    flows: Vec<SequenceFlowDefinition>,
    attached_to: Option<ActivityId>,
    join_buffer: Option<JoinBuffer>,
    behaviour: Option<Box<dyn Behaviour<C>>>,
    formatter: Box<dyn Formatter>,
    options: EngineOptions,
    state_message: Option<Message>,
    last_inbound_first_id: Option<FlowId>,
    pending_compensation_id: Option<String>,
    run_consumer_tag: Option<ConsumerTag>,
    inbound_consumer_tag: Option<ConsumerTag>,
    execution_consumer_tag: Option<ConsumerTag>,
}

impl<C: Clock> Activity<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ActivityId,
        activity_type: impl Into<String>,
        flags: ActivityFlags,
        flows: Vec<SequenceFlowDefinition>,
        attached_to: Option<ActivityId>,
        inbound_trigger_count: usize,
        behaviour: Option<Box<dyn Behaviour<C>>>,
        formatter: Box<dyn Formatter>,
        options: EngineOptions,
        clock: C,
    ) -> Self {
        let broker = Broker::new(clock.clone());
        let join_buffer = flags.is_parallel_join.then(|| JoinBuffer::new(inbound_trigger_count.max(1)));
        let mut activity = Self {
            id,
            activity_type: activity_type.into(),
            broker,
            flags,
            counters: Counters::default(),
            status: None,
            stopped: false,
            execution_state: ExecutionState::default(),
            flows,
            attached_to,
            join_buffer,
            behaviour,
            formatter,
            options,
            state_message: None,
            last_inbound_first_id: None,
            pending_compensation_id: None,
            run_consumer_tag: None,
            inbound_consumer_tag: None,
            execution_consumer_tag: None,
        };
        activity.init();
        activity
    }

    fn init(&mut self) {
        self.broker.assert_exchange(RUN_EXCHANGE, ExchangeKind::Topic);
        self.broker.assert_exchange(crate::events::EVENT_EXCHANGE, ExchangeKind::Topic);
        self.broker.assert_exchange(API_EXCHANGE, ExchangeKind::Topic);
        self.broker.assert_exchange(EXECUTION_EXCHANGE, ExchangeKind::Topic);
        self.broker.assert_exchange(FORMAT_EXCHANGE, ExchangeKind::Topic);

        self.broker.assert_queue(INBOUND_QUEUE, QueueOptions { durable: true, auto_delete: false });
        self.broker.assert_queue(RUN_QUEUE, QueueOptions { durable: true, auto_delete: false });
        self.broker.assert_queue(EXECUTION_QUEUE, QueueOptions { durable: false, auto_delete: false });
        self.broker.assert_queue(FORMAT_QUEUE, QueueOptions { durable: false, auto_delete: false });

        let _ = self.broker.bind_queue(RUN_QUEUE, RUN_EXCHANGE, "run.#");
        let _ = self.broker.bind_queue(EXECUTION_QUEUE, EXECUTION_EXCHANGE, "execute.#");
        let _ = self.broker.bind_queue(FORMAT_QUEUE, FORMAT_EXCHANGE, "#");

        tracing::debug!(activity_id = %self.id, activity_type = %self.activity_type, "activity initialized");
    }

    /// Begin consuming `inbound-q`; idempotent.
    pub fn activate(&mut self) {
        if self.inbound_consumer_tag.is_none() {
            let tag = ConsumerTag::from_string(INBOUND_CONSUMER_TAG);
            if self
                .broker
                .subscribe_tmp(INBOUND_QUEUE, ConsumeOptions { exclusive: true, prefetch: 1000, tag: Some(tag), ..Default::default() })
                .is_ok()
            {
                self.inbound_consumer_tag = Some(tag);
            }
        }
    }

    pub fn deactivate(&mut self) {
        if let Some(tag) = self.inbound_consumer_tag.take() {
            let _ = self.broker.cancel(tag);
        }
    }

    // ---- public operations -------------------------------------------------

    pub fn run(&mut self, payload: Value) -> Result<(), EngineError> {
        if self.status.is_some() {
            return Err(EngineError::AlreadyRunning);
        }
        self.begin_consuming_run_queue()?;
        let content = RunContent { payload, ..Default::default() };
        self.broker.publish(RUN_EXCHANGE, "run.enter", content.to_value(), persistent())?;
        self.pump_run_until_quiet()
    }

    pub fn discard(&mut self, payload: Value) -> Result<(), EngineError> {
        if self.status.is_none() {
            self.begin_consuming_run_queue()?;
            let content = RunContent { payload, is_discarded: true, ..Default::default() };
            self.broker.publish(RUN_EXCHANGE, "run.discard", content.to_value(), persistent())?;
        } else if let Some(execution_id) = self.execution_state.execution_id {
            if let Some(behaviour) = self.behaviour.as_mut() {
                let mut out = ExecutionPublisher::new(&mut self.broker, execution_id);
                behaviour.discard(&mut out);
            }
        } else {
            let _ = self.broker.purge(RUN_QUEUE);
            let content = self
                .state_message
                .as_ref()
                .map(|m| m.content.clone())
                .unwrap_or(Value::Null);
            self.broker.publish(RUN_EXCHANGE, "run.discard", content, persistent())?;
        }
        self.pump_run_until_quiet()
    }

    pub fn stop(&mut self) -> Result<(), EngineError> {
        if let Some(tag) = self.run_consumer_tag.take() {
            let _ = self.broker.cancel(tag);
        }
        if let Some(tag) = self.execution_consumer_tag.take() {
            let _ = self.broker.cancel(tag);
        }
        self.deactivate();
        self.stopped = true;
        events::publish_event(&mut self.broker, "activity.stop", Value::Null)?;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), EngineError> {
        if self.run_consumer_tag.is_some() {
            return Err(EngineError::ResumeWhileConsuming);
        }
        if self.status.is_none() {
            self.activate();
            return Ok(());
        }
        self.stopped = false;
        self.activate();
        self.begin_consuming_run_queue()?;
        self.broker.publish(RUN_EXCHANGE, "run.resume", Value::Null, PublishOptions::default())?;
        self.pump_run_until_quiet()
    }

    pub fn recover(&mut self, snapshot: ActivitySnapshot) -> Result<(), EngineError> {
        if self.run_consumer_tag.is_some() {
            return Err(EngineError::RecoverWhileRunning);
        }
        self.status = snapshot.status;
        self.stopped = snapshot.stopped;
        self.counters = snapshot.counters;
        self.execution_state.execution_id = snapshot.execution_id;
        self.broker.recover(snapshot.broker);
        tracing::info!(activity_id = %self.id, "activity recovered");
        Ok(())
    }

    pub fn get_state(&self) -> ActivitySnapshot {
        ActivitySnapshot {
            id: self.id,
            activity_type: self.activity_type.clone(),
            status: self.status,
            stopped: self.stopped,
            counters: self.counters,
            execution_id: self.execution_state.execution_id,
            broker: self.broker.get_state(true),
        }
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    pub fn flags(&self) -> ActivityFlags {
        self.flags
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn run_queue_len(&self) -> usize {
        self.broker.queue_message_count(RUN_QUEUE)
    }

    pub fn execution_queue_len(&self) -> usize {
        self.broker.queue_message_count(EXECUTION_QUEUE)
    }

    pub fn inbound_queue_len(&self) -> usize {
        self.broker.queue_message_count(INBOUND_QUEUE)
    }

    pub fn execution_queue_consumer_count(&self) -> usize {
        self.broker.queue_consumer_count(EXECUTION_QUEUE)
    }

    /// Routing key of the currently held run-queue state message, if any.
    pub fn pending_routing_key(&self) -> Option<&str> {
        self.state_message.as_ref().map(|m| m.routing_key.as_str())
    }

    // ---- event API -------------------------------------------------------

    /// Subscribe to every `event.*` message matching `pattern`, durably
    /// (the consumer stays registered until the caller cancels it).
    pub fn on(&mut self, queue: &str, pattern: &str) -> Result<ConsumerTag, EngineError> {
        Ok(events::on(&mut self.broker, queue, pattern)?)
    }

    /// Same as [`Self::on`]; the caller is expected to cancel after the
    /// first matching delivery.
    pub fn once(&mut self, queue: &str, pattern: &str) -> Result<ConsumerTag, EngineError> {
        Ok(events::once(&mut self.broker, queue, pattern)?)
    }

    /// Subscribe to `pattern`, pump the run/execution queues until a
    /// matching event arrives (or nothing more can progress), then cancel
    /// the subscription and return the first match.
    pub fn wait_for(&mut self, pattern: &str) -> Result<Option<Value>, EngineError> {
        let queue = format!("_wait-for-{pattern}");
        let tag = events::on(&mut self.broker, &queue, pattern)?;
        loop {
            if let Some(delivery) = self.broker.consume_next(tag)? {
                self.broker.cancel(tag)?;
                return Ok(Some(delivery.message.content));
            }
            if !self.pump_run()? && !self.pump_execution()? {
                self.broker.cancel(tag)?;
                return Ok(None);
            }
        }
    }

    /// Publish a fatal, non-routed error on the event exchange.
    pub fn emit_fatal(&mut self, source: &str, error: &crate::error::ActivityError) -> Result<(), EngineError> {
        Ok(events::emit_fatal(&mut self.broker, source, error)?)
    }

    /// Pull the next delivery (if any) queued for an `on`/`once` consumer.
    pub fn consume_event(&mut self, tag: ConsumerTag) -> Result<Option<Value>, EngineError> {
        Ok(self.broker.consume_next(tag)?.map(|delivery| delivery.message.content))
    }

    // ---- inbound arrival -----------------------------------------------------

    /// Deliver one externally-triggered inbound message directly (the
    /// surrounding `Process`/`Definition` orchestrator is the real source of
    /// these in a full system; this crate only reacts to them).
    pub fn inbound_arrived(&mut self, source: FlowId, routing_key: &str, content: Value) -> Result<(), EngineError> {
        if self.last_inbound_first_id.is_none() {
            self.last_inbound_first_id = Some(source);
        }
        // A for-compensation activity subscribes to inbound associations
        // instead of inbound sequence flows; every other activity ignores
        // association routing keys.
        if self.flags.is_for_compensation {
            return match routing_key {
                "association.take" => self.on_inbound_take(source, content),
                "association.discard" => self.on_inbound_discard(source, content),
                "association.complete" => self.on_association_complete(source, content),
                _ => Ok(()),
            };
        }
        match routing_key {
            "flow.take" | "activity.enter" => self.on_inbound_take(source, content),
            "flow.discard" | "activity.discard" => self.on_inbound_discard(source, content),
            _ => Ok(()),
        }
    }

    /// §4.7 compensation: publish `event compensation.start` with a
    /// deterministic id, start the normal consume loop, and the matching
    /// `compensation.end` is published once this run reaches `run.leave`.
    fn on_association_complete(&mut self, source: FlowId, content: Value) -> Result<(), EngineError> {
        let compensation_id = compensation::compensation_id(&self.id, source.as_str());
        self.pending_compensation_id = Some(compensation_id.clone());
        events::publish_event(&mut self.broker, "compensation.start", serde_json::json!({ "id": compensation_id }))?;
        self.run(content)
    }

    fn on_inbound_take(&mut self, source: FlowId, content: Value) -> Result<(), EngineError> {
        if let Some(buffer) = self.join_buffer.as_mut() {
            let decision = buffer.arrive(InboundMessage { source, taken: true, discard_sequence: vec![], content });
            return self.apply_join_decision(decision);
        }
        self.run(content)
    }

    fn on_inbound_discard(&mut self, source: FlowId, content: Value) -> Result<(), EngineError> {
        if let Some(buffer) = self.join_buffer.as_mut() {
            let discard_sequence = vec![source];
            let decision = buffer.arrive(InboundMessage { source, taken: false, discard_sequence, content });
            return self.apply_join_decision(decision);
        }
        self.discard(content)
    }

    fn apply_join_decision(&mut self, decision: Option<JoinDecision>) -> Result<(), EngineError> {
        match decision {
            None => Ok(()),
            Some(JoinDecision::Run(messages)) => {
                // Merge every buffered inbound message's content (later
                // branches win on key conflicts) and keep the full buffer
                // under `inbound` so a behaviour can still see each arrival.
                let mut merged = serde_json::Map::new();
                let mut inbound = Vec::with_capacity(messages.len());
                for message in &messages {
                    if let Some(obj) = message.content.as_object() {
                        merged.extend(obj.clone());
                    }
                    inbound.push(message.content.clone());
                }
                merged.insert("inbound".to_string(), Value::Array(inbound));
                self.run(Value::Object(merged))
            }
            Some(JoinDecision::RunDiscard(discard_sequence)) => {
                let content = RunContent { is_discarded: true, discard_sequence: Some(discard_sequence), ..Default::default() };
                self.discard(content.to_value())
            }
        }
    }

    // ---- shake ----------------------------------------------------------------

    pub fn shake(&mut self, mut trail: crate::shake::ShakeTrail) -> crate::shake::ShakeTrail {
        trail.visit(self.id, self.activity_type.clone());
        if self.flags.is_end {
            let _ = events::publish_event(&mut self.broker, "activity.shake.end", serde_json::json!({ "id": self.id }));
        }
        trail
    }

    // ---- run-queue pump ---------------------------------------------------

    fn begin_consuming_run_queue(&mut self) -> Result<(), EngineError> {
        if self.run_consumer_tag.is_none() {
            let tag = ConsumerTag::from_string(RUN_CONSUMER_TAG);
            self.broker.assert_consumer(
                RUN_QUEUE,
                ConsumeOptions { exclusive: true, tag: Some(tag), ..Default::default() },
            )?;
            self.run_consumer_tag = Some(tag);
        }
        if self.execution_consumer_tag.is_none() {
            let tag = ConsumerTag::from_string(EXECUTION_CONSUMER_TAG);
            self.broker.assert_consumer(
                EXECUTION_QUEUE,
                ConsumeOptions { exclusive: true, tag: Some(tag), ..Default::default() },
            )?;
            self.execution_consumer_tag = Some(tag);
        }
        Ok(())
    }

    /// Drain `run-q` and `execution-q` until both are empty or the run has
    /// suspended waiting on an external signal.
    ///
    /// In step mode this advances exactly one run-queue message (plus
    /// whatever it synchronously triggers on `execution-q`); the caller
    /// drives further progress via [`Activity::next`].
    pub fn pump_run_until_quiet(&mut self) -> Result<(), EngineError> {
        if self.options.step {
            self.pump_run()?;
            self.pump_execution()?;
            return Ok(());
        }
        loop {
            let mut progressed = self.pump_run()?;
            progressed |= self.pump_execution()?;
            if !progressed {
                return Ok(());
            }
        }
    }

    pub fn pump_run(&mut self) -> Result<bool, EngineError> {
        let Some(tag) = self.run_consumer_tag else { return Ok(false) };
        let Some(delivery) = self.broker.consume_next(tag)? else { return Ok(false) };
        let message = delivery.message.clone();
        self.handle_run_message(&message)?;
        // `run.execute` stays unacked: it is the state message representing
        // "currently executing" until the execution-queue bridge resolves it.
        if !self.options.step && message.routing_key != "run.execute" {
            let _ = self.broker.ack(RUN_QUEUE, &message.id);
        }
        Ok(true)
    }

    /// Step-mode counterpart: ack the pending state message and allow the
    /// state machine to advance. Refuses while `executing` or `formatting`.
    pub fn next(&mut self) -> Result<Option<Message>, EngineError> {
        match self.status {
            Some(Status::Executing) | Some(Status::Formatting) => Ok(None),
            _ => {
                if self.run_consumer_tag.is_none() {
                    return Ok(None);
                }
                let Some(msg) = self.state_message.take() else { return Ok(None) };
                let _ = self.broker.ack(RUN_QUEUE, &msg.id);
                self.pump_run_until_quiet()?;
                Ok(Some(msg))
            }
        }
    }

    fn handle_run_message(&mut self, message: &Message) -> Result<(), EngineError> {
        self.state_message = Some(message.clone());
        let content = RunContent::from_value(&message.content);
        let redelivered = message.redelivered;

        match message.routing_key.as_str() {
            "run.enter" | "run.discard" => {
                self.status = Some(Status::Entered);
                if !redelivered {
                    events::publish_event(&mut self.broker, "activity.enter", content.to_value())?;
                }
                let next_key = if message.routing_key == "run.discard" { "run.discarded" } else { "run.start" };
                self.broker.publish(RUN_EXCHANGE, next_key, content.to_value(), persistent())?;
            }
            "run.start" => {
                self.status = Some(Status::Started);
                events::publish_event(&mut self.broker, "activity.start", content.to_value())?;
                self.broker.publish(RUN_EXCHANGE, "run.execute", content.to_value(), persistent())?;
            }
            "run.execute" => {
                self.status = Some(Status::Executing);
                let execution_id = if redelivered {
                    self.execution_state.execution_id.unwrap_or_else(|| self.execution_state.start_new())
                } else {
                    self.execution_state.start_new()
                };
                let formatted = self.run_formatter(content.payload.clone());
                if let Some(mut behaviour) = self.behaviour.take() {
                    let exec_message = ExecuteMessage { execution_id, parent: None, content: formatted };
                    let mut out = ExecutionPublisher::new(&mut self.broker, execution_id);
                    behaviour.execute(&exec_message, &mut out);
                    self.behaviour = Some(behaviour);
                }
            }
            "run.execute.passthrough" => {
                if !redelivered {
                    self.broker.publish(RUN_EXCHANGE, "run.end", content.to_value(), persistent())?;
                }
            }
            "run.end" => {
                self.status = Some(Status::End);
                self.counters.taken += 1;
                if !redelivered {
                    events::publish_event(&mut self.broker, "activity.end", content.to_value())?;
                }
                self.finish_run(content, false)?;
            }
            "run.discarded" => {
                self.status = Some(Status::Discarded);
                self.counters.discarded += 1;
                if !redelivered {
                    events::publish_event(&mut self.broker, "activity.discard", content.to_value())?;
                }
                self.finish_run(content, true)?;
            }
            "run.error" => {
                self.status = Some(Status::Error);
                events::publish_event(&mut self.broker, "activity.error", content.to_value())?;
            }
            "run.leave" => {
                self.status = None;
                self.execution_state.clear();
                self.broker.publish(RUN_EXCHANGE, "run.next", Value::Null, PublishOptions::default())?;
                events::publish_event(&mut self.broker, "activity.leave", content.to_value())?;
                if let Some(compensation_id) = self.pending_compensation_id.take() {
                    events::publish_event(&mut self.broker, "compensation.end", serde_json::json!({ "id": compensation_id }))?;
                }
            }
            "run.next" => {
                self.activate();
            }
            "run.resume" => {
                if let Some(state) = self.state_message.clone() {
                    let resumable = matches!(
                        state.routing_key.as_str(),
                        "run.enter" | "run.start" | "run.discarded" | "run.end" | "run.leave"
                    );
                    if resumable && state.redelivered {
                        self.broker.publish(
                            RUN_EXCHANGE,
                            &state.routing_key,
                            state.content.clone(),
                            persistent(),
                        )?;
                    }
                }
            }
            other => {
                tracing::warn!(routing_key = other, "unhandled run-queue routing key");
            }
        }
        Ok(())
    }

    fn finish_run(&mut self, content: RunContent, is_discarded: bool) -> Result<(), EngineError> {
        let plan = dispatch::plan_leave(LeaveContext {
            flows: &self.flows,
            is_discarded,
            is_boundary_event: self.attached_to.is_some(),
            ignore_outbound: content.ignore_outbound,
            outbound_take_one: content.outbound_take_one,
            precomputed: content.outbound.clone(),
            discard_sequence: content.discard_sequence.clone(),
            first_inbound: self.last_inbound_first_id,
            source_message: content.payload.clone(),
        });

        let plan = match plan {
            Ok(plan) => plan,
            Err(err) => {
                // An evaluation error is an activity error, routed like any
                // other: `run.error` (which itself fires `event
                // activity.error`) followed by `run.discarded`, not a
                // fatal/unrouted stop.
                let mut error_content = content;
                error_content.error = Some(err.to_string());
                let value = error_content.to_value();
                self.broker.publish(RUN_EXCHANGE, "run.error", value.clone(), persistent())?;
                self.broker.publish(RUN_EXCHANGE, "run.discarded", value, persistent())?;
                return Ok(());
            }
        };

        match plan {
            LeavePlan::Dispatch(results) => {
                for result in &results {
                    let verb = match result.action {
                        crate::evaluator::FlowAction::Take => "take",
                        crate::evaluator::FlowAction::Discard => "discard",
                    };
                    let routing_key = format!("run.outbound.{verb}");
                    let seq_id = dispatch::sequence_id_for(&result.id, result.action);
                    self.broker.publish(
                        RUN_EXCHANGE,
                        &routing_key,
                        serde_json::json!({ "flowId": result.id, "sequenceId": seq_id }),
                        PublishOptions::default(),
                    )?;
                }
            }
            LeavePlan::LeaveImmediately => {}
        }
        self.broker.publish(RUN_EXCHANGE, "run.leave", content.to_value(), persistent())?;
        Ok(())
    }

    fn run_formatter(&mut self, payload: Value) -> Value {
        let previous = self.status;
        self.status = Some(Status::Formatting);
        self.formatter.start(payload.clone());
        let result = match self.formatter.poll() {
            FormatOutcome::Complete(value) => value,
            FormatOutcome::Pending => payload,
        };
        self.status = previous;
        result
    }

    // ---- execution-queue bridge --------------------------------------------

    pub fn pump_execution(&mut self) -> Result<bool, EngineError> {
        let Some(tag) = self.execution_consumer_tag else { return Ok(false) };
        let Some(delivery) = self.broker.consume_next(tag)? else { return Ok(false) };
        let message = delivery.message.clone();
        let _ = self.broker.ack(EXECUTION_QUEUE, &message.id);

        // `ExecutionPublisher::publish` wraps behaviour content in an
        // `{executionId, content}` envelope; unwrap before classifying.
        let inner = message.content.get("content").cloned().unwrap_or(Value::Null);

        let event_name = execution_bridge::event_name_for(&message.routing_key).to_string();
        events::publish_event(&mut self.broker, &format!("activity.{event_name}"), inner.clone())?;

        let outcome = execution_bridge::classify(&message.routing_key, inner);
        let pending_execute = self.state_message.clone().filter(|m| m.routing_key == "run.execute");

        match outcome {
            BridgeOutcome::Waiting(_) => {}
            BridgeOutcome::OutboundTake(outbound) => {
                if let Some(pending) = pending_execute {
                    let _ = self.broker.ack(RUN_QUEUE, &pending.id);
                    let merged = execution_bridge::merge_content(&pending.content, &outbound);
                    self.broker.publish(RUN_EXCHANGE, "run.execute.passthrough", merged, persistent())?;
                }
            }
            BridgeOutcome::Error(err) => {
                if let Some(pending) = pending_execute {
                    let _ = self.broker.ack(RUN_QUEUE, &pending.id);
                    let mut content = RunContent::from_value(&pending.content);
                    content.error = Some(err.clone());
                    let value = content.to_value();
                    self.broker.publish(RUN_EXCHANGE, "run.error", value.clone(), persistent())?;
                    self.broker.publish(RUN_EXCHANGE, "run.discarded", value, persistent())?;
                }
            }
            BridgeOutcome::Discard => {
                if let Some(pending) = pending_execute {
                    let _ = self.broker.ack(RUN_QUEUE, &pending.id);
                    self.broker.publish(RUN_EXCHANGE, "run.discarded", pending.content.clone(), persistent())?;
                }
            }
            BridgeOutcome::Completed(output) => {
                if let Some(pending) = pending_execute {
                    let _ = self.broker.ack(RUN_QUEUE, &pending.id);
                    let mut content = RunContent::from_value(&pending.content);
                    content.payload = output;
                    self.broker.publish(RUN_EXCHANGE, "run.end", content.to_value(), persistent())?;
                }
            }
        }
        Ok(true)
    }

    /// External signal into the current behaviour, e.g. a user task
    /// completing. Out-of-scope behaviours are expected to call
    /// [`ExecutionPublisher::completed`] themselves; this is a convenience
    /// for tests and simple synchronous behaviours.
    pub fn signal(&mut self, output: Value) -> Result<(), EngineError> {
        if let Some(execution_id) = self.execution_state.execution_id {
            self.broker.publish(
                EXECUTION_EXCHANGE,
                "execute.completed",
                serde_json::json!({ "executionId": execution_id, "content": output }),
                PublishOptions::default(),
            )?;
        }
        self.pump_run_until_quiet()
    }

    pub fn compensation_id(&self, sequence_id: &str) -> String {
        compensation::compensation_id(&self.id, sequence_id)
    }
}

fn persistent() -> PublishOptions {
    PublishOptions { persistent: true, ..Default::default() }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
