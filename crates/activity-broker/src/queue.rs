// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::message::Message;
use activity_core::{ConsumerTag, MessageId};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, Default)]
pub struct QueueOptions {
    pub durable: bool,
    pub auto_delete: bool,
}

/// A single named queue: a FIFO of pending messages plus the set of
/// deliveries awaiting acknowledgement.
#[derive(Debug, Clone)]
pub struct Queue {
    pub name: String,
    pub options: QueueOptions,
    pub messages: VecDeque<Message>,
    pub unacked: Vec<(ConsumerTag, Message)>,
    pub consumers: Vec<ConsumerTag>,
}

impl Queue {
    pub fn new(name: impl Into<String>, options: QueueOptions) -> Self {
        Self {
            name: name.into(),
            options,
            messages: VecDeque::new(),
            unacked: Vec::new(),
            consumers: Vec::new(),
        }
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }

    pub fn ack(&mut self, message_id: &MessageId) -> Option<Message> {
        if let Some(pos) = self.unacked.iter().position(|(_, m)| &m.id == message_id) {
            Some(self.unacked.remove(pos).1)
        } else {
            None
        }
    }

    pub fn purge(&mut self) {
        self.messages.clear();
        self.unacked.clear();
    }
}
