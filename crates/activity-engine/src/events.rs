// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event Broker façade: thin helpers over [`Broker`] for callers that only
//! want to observe `event.*` traffic without dealing with exchange/queue
//! mechanics directly.

use activity_broker::{BrokerError, ConsumeOptions, PublishOptions};
use activity_broker::Broker;
use activity_core::{Clock, ConsumerTag};
use serde_json::Value;

pub const EVENT_EXCHANGE: &str = "event";

/// Subscribe to every `event.*` message matching `pattern`. The returned
/// consumer stays registered until explicitly cancelled — the `on`
/// counterpart of the broker's durable consumers.
pub fn on<C: Clock>(broker: &mut Broker<C>, queue: &str, pattern: &str) -> Result<ConsumerTag, BrokerError> {
    broker.assert_queue(queue, activity_broker::QueueOptions { durable: false, auto_delete: true });
    broker.bind_queue(queue, EVENT_EXCHANGE, pattern)?;
    broker.subscribe_tmp(queue, ConsumeOptions { no_ack: true, ..Default::default() })
}

/// Like [`on`], but the caller is expected to cancel after the first
/// matching delivery (there is no separate "fires once" primitive on the
/// broker; the once-ness is a calling convention here).
pub fn once<C: Clock>(broker: &mut Broker<C>, queue: &str, pattern: &str) -> Result<ConsumerTag, BrokerError> {
    on(broker, queue, pattern)
}

/// Publish a fatal error on the event exchange with `mandatory: true` so an
/// unbound error surfaces rather than being silently dropped.
pub fn emit_fatal<C: Clock>(
    broker: &mut Broker<C>,
    source: &str,
    error: &crate::error::ActivityError,
) -> Result<(), BrokerError> {
    broker.publish(
        EVENT_EXCHANGE,
        "activity.error",
        serde_json::json!({ "source": source, "error": error.to_string() }),
        PublishOptions { mandatory: true, ..Default::default() },
    )?;
    Ok(())
}

/// Publish an arbitrary `event.<routing_key>` message.
pub fn publish_event<C: Clock>(
    broker: &mut Broker<C>,
    routing_key: &str,
    content: Value,
) -> Result<(), BrokerError> {
    broker.publish(EVENT_EXCHANGE, routing_key, content, PublishOptions::default())?;
    Ok(())
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
