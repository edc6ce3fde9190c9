// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound arrival and the parallel-join buffering protocol.

use activity_core::FlowId;
use serde_json::Value;

/// One inbound message as buffered for a parallel join.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub source: FlowId,
    pub taken: bool,
    pub discard_sequence: Vec<FlowId>,
    pub content: Value,
}

/// What the inbound consumer decided to do with a buffered wave.
#[derive(Debug, Clone)]
pub enum JoinDecision {
    /// Run with every buffered message as inbound context.
    Run(Vec<InboundMessage>),
    /// Run-discard with the union (order-preserving) of every buffered
    /// message's discard sequence.
    RunDiscard(Vec<FlowId>),
}

/// Buffers one inbound message per distinct source flow id until every
/// expected trigger has arrived, then yields a join decision.
///
/// Used only by parallel-join activities (`ActivityFlags::is_parallel_join`);
/// non-join activities run immediately on each arrival instead.
#[derive(Debug, Clone, Default)]
pub struct JoinBuffer {
    expected: usize,
    buffered: Vec<InboundMessage>,
}

impl JoinBuffer {
    pub fn new(expected_trigger_count: usize) -> Self {
        Self { expected: expected_trigger_count, buffered: Vec::new() }
    }

    /// Record an arrival. Duplicate arrivals for an already-buffered source
    /// are ignored (first wins). Returns a decision once the buffer holds
    /// one message per expected trigger, draining it in the process.
    pub fn arrive(&mut self, message: InboundMessage) -> Option<JoinDecision> {
        if self.buffered.iter().any(|m| m.source == message.source) {
            return None;
        }
        self.buffered.push(message);
        if self.buffered.len() < self.expected {
            return None;
        }

        let wave = std::mem::take(&mut self.buffered);
        if wave.iter().any(|m| m.taken) {
            Some(JoinDecision::Run(wave))
        } else {
            let mut discard_sequence = Vec::new();
            for m in &wave {
                for id in &m.discard_sequence {
                    if !discard_sequence.contains(id) {
                        discard_sequence.push(*id);
                    }
                }
            }
            Some(JoinDecision::RunDiscard(discard_sequence))
        }
    }

    pub fn pending_count(&self) -> usize {
        self.buffered.len()
    }
}

#[cfg(test)]
#[path = "inbound_tests.rs"]
mod tests;
