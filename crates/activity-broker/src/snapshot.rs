// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::exchange::{Binding, ExchangeKind};
use crate::message::Message;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeSnapshot {
    pub name: String,
    pub kind: ExchangeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub name: String,
    pub durable: bool,
    pub auto_delete: bool,
    /// Pending + previously-unacked (now marked redelivered) persistent
    /// messages, in delivery order.
    pub messages: Vec<Message>,
}

/// A serializable point-in-time copy of a broker's topology and queue
/// contents, suitable for a `getState`/`recover` round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerSnapshot {
    pub exchanges: Vec<ExchangeSnapshot>,
    pub bindings: Vec<Binding>,
    pub queues: Vec<QueueSnapshot>,
}
