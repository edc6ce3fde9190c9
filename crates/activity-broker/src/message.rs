// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use activity_core::MessageId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Publish-time options for a single message.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Survives `getState`/`recover`; non-persistent messages are dropped
    /// from snapshots and are not redelivered after a recover.
    pub persistent: bool,
    /// If true and no bound queue matches the routing key, publish fails
    /// with [`crate::BrokerError::NoMatchingQueue`].
    pub mandatory: bool,
    pub message_type: Option<String>,
    pub correlation_id: Option<String>,
    pub priority: u8,
}

/// A message enqueued on (or delivered from) a queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub exchange: String,
    pub routing_key: String,
    pub content: Value,
    pub persistent: bool,
    pub message_type: Option<String>,
    pub correlation_id: Option<String>,
    pub priority: u8,
    pub redelivered: bool,
    pub timestamp_ms: u64,
}

/// A message handed to a consumer, carrying the tag it must be acked against.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub queue: String,
    pub consumer_tag: activity_core::ConsumerTag,
    pub message: Message,
}
