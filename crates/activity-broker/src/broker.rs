// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process topic message broker.
//!
//! One [`Broker`] belongs to exactly one activity. It is not shared across
//! threads; the activity drives it from a single logical worker, pulling
//! deliveries one at a time via [`Broker::consume_next`].

use crate::consumer::{ConsumeOptions, ConsumerInfo};
use crate::error::BrokerError;
use crate::exchange::{Binding, Exchange, ExchangeKind};
use crate::message::{Delivery, Message, PublishOptions};
use crate::queue::{Queue, QueueOptions};
use crate::snapshot::{BrokerSnapshot, ExchangeSnapshot, QueueSnapshot};
use crate::topic;
use activity_core::{Clock, ConsumerTag, MessageId};
use std::collections::HashMap;

pub struct Broker<C: Clock> {
    clock: C,
    exchanges: HashMap<String, Exchange>,
    queues: HashMap<String, Queue>,
    bindings: Vec<Binding>,
    consumers: HashMap<ConsumerTag, ConsumerInfo>,
}

impl<C: Clock> std::fmt::Debug for Broker<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broker")
            .field("exchanges", &self.exchanges.len())
            .field("queues", &self.queues.len())
            .field("bindings", &self.bindings.len())
            .field("consumers", &self.consumers.len())
            .finish()
    }
}

impl<C: Clock> Broker<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            exchanges: HashMap::new(),
            queues: HashMap::new(),
            bindings: Vec::new(),
            consumers: HashMap::new(),
        }
    }

    pub fn assert_exchange(&mut self, name: impl Into<String>, kind: ExchangeKind) {
        let name = name.into();
        self.exchanges.entry(name.clone()).or_insert(Exchange { name, kind });
    }

    pub fn assert_queue(&mut self, name: impl Into<String>, options: QueueOptions) {
        let name = name.into();
        self.queues.entry(name.clone()).or_insert_with(|| Queue::new(name, options));
    }

    pub fn bind_queue(
        &mut self,
        queue: impl Into<String>,
        exchange: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Result<(), BrokerError> {
        let queue = queue.into();
        let exchange = exchange.into();
        if !self.exchanges.contains_key(&exchange) {
            return Err(BrokerError::ExchangeNotFound(exchange));
        }
        if !self.queues.contains_key(&queue) {
            return Err(BrokerError::QueueNotFound(queue));
        }
        let pattern = pattern.into();
        self.bindings.push(Binding { exchange, queue, pattern });
        Ok(())
    }

    /// Publish `content` with routing key `routing_key` on `exchange`.
    ///
    /// Returns the set of queue names the message was routed to. If
    /// `options.mandatory` is set and nothing matched, returns
    /// [`BrokerError::NoMatchingQueue`].
    pub fn publish(
        &mut self,
        exchange: &str,
        routing_key: &str,
        content: serde_json::Value,
        options: PublishOptions,
    ) -> Result<Vec<String>, BrokerError> {
        if !self.exchanges.contains_key(exchange) {
            return Err(BrokerError::ExchangeNotFound(exchange.to_string()));
        }
        let matched: Vec<String> = self
            .bindings
            .iter()
            .filter(|b| b.exchange == exchange && topic::matches(&b.pattern, routing_key))
            .map(|b| b.queue.clone())
            .collect();

        if matched.is_empty() {
            if options.mandatory {
                return Err(BrokerError::NoMatchingQueue {
                    exchange: exchange.to_string(),
                    routing_key: routing_key.to_string(),
                });
            }
            tracing::debug!(exchange, routing_key, "publish: no matching queue");
            return Ok(matched);
        }

        for queue_name in &matched {
            let message = Message {
                id: MessageId::new(),
                exchange: exchange.to_string(),
                routing_key: routing_key.to_string(),
                content: content.clone(),
                persistent: options.persistent,
                message_type: options.message_type.clone(),
                correlation_id: options.correlation_id.clone(),
                priority: options.priority,
                redelivered: false,
                timestamp_ms: self.clock.epoch_ms(),
            };
            tracing::debug!(
                exchange,
                routing_key,
                queue = %queue_name,
                message_id = %message.id,
                "publish"
            );
            if let Some(queue) = self.queues.get_mut(queue_name) {
                queue.messages.push_back(message);
            }
        }
        Ok(matched)
    }

    /// Register a durable consumer (survives `recover`).
    pub fn assert_consumer(
        &mut self,
        queue: impl Into<String>,
        mut options: ConsumeOptions,
    ) -> Result<ConsumerTag, BrokerError> {
        options.durable = true;
        self.subscribe(queue, options)
    }

    /// Register a transient consumer (does not survive `recover`).
    pub fn subscribe_tmp(
        &mut self,
        queue: impl Into<String>,
        mut options: ConsumeOptions,
    ) -> Result<ConsumerTag, BrokerError> {
        options.durable = false;
        self.subscribe(queue, options)
    }

    fn subscribe(
        &mut self,
        queue: impl Into<String>,
        options: ConsumeOptions,
    ) -> Result<ConsumerTag, BrokerError> {
        let queue_name = queue.into();
        let q = self.queues.get_mut(&queue_name).ok_or_else(|| BrokerError::QueueNotFound(queue_name.clone()))?;
        if options.exclusive && !q.consumers.is_empty() {
            return Err(BrokerError::ExclusiveConsumerExists(queue_name));
        }
        let tag = options.tag.unwrap_or_else(ConsumerTag::new);
        q.consumers.push(tag);
        self.consumers.insert(tag, ConsumerInfo { tag, queue: queue_name, options });
        tracing::debug!(consumer_tag = %tag, "subscribed");
        Ok(tag)
    }

    /// Cancel a consumer. Unacked deliveries for it stay unacked until the
    /// next `recover`, at which point they are requeued with
    /// `redelivered = true`.
    pub fn cancel(&mut self, tag: ConsumerTag) -> Result<(), BrokerError> {
        let info = self.consumers.remove(&tag).ok_or(BrokerError::UnknownConsumerTag(tag.to_string()))?;
        if let Some(q) = self.queues.get_mut(&info.queue) {
            q.consumers.retain(|t| *t != tag);
            if q.consumers.is_empty() && q.options.auto_delete {
                self.queues.remove(&info.queue);
            }
        }
        tracing::debug!(consumer_tag = %tag, "cancelled");
        Ok(())
    }

    /// Pull the next eligible delivery for `tag`, respecting prefetch.
    /// `no_ack` consumers are acked immediately on delivery.
    pub fn consume_next(&mut self, tag: ConsumerTag) -> Result<Option<Delivery>, BrokerError> {
        let info = self.consumers.get(&tag).ok_or(BrokerError::UnknownConsumerTag(tag.to_string()))?.clone();
        let queue = self.queues.get_mut(&info.queue).ok_or_else(|| BrokerError::QueueNotFound(info.queue.clone()))?;

        if info.options.prefetch > 0 {
            let outstanding = queue.unacked.iter().filter(|(t, _)| *t == tag).count();
            if outstanding >= info.options.prefetch {
                return Ok(None);
            }
        }

        let Some(message) = queue.messages.pop_front() else {
            return Ok(None);
        };

        if !info.options.no_ack {
            queue.unacked.push((tag, message.clone()));
        }

        tracing::debug!(
            consumer_tag = %tag,
            queue = %info.queue,
            message_id = %message.id,
            routing_key = %message.routing_key,
            "deliver"
        );

        Ok(Some(Delivery { queue: info.queue, consumer_tag: tag, message }))
    }

    pub fn ack(&mut self, queue: &str, message_id: &MessageId) -> Result<(), BrokerError> {
        let q = self.queues.get_mut(queue).ok_or_else(|| BrokerError::QueueNotFound(queue.to_string()))?;
        q.ack(message_id).ok_or_else(|| BrokerError::UnknownDeliveryTag {
            queue: queue.to_string(),
            message_id: message_id.to_string(),
        })?;
        Ok(())
    }

    pub fn purge(&mut self, queue: &str) -> Result<(), BrokerError> {
        let q = self.queues.get_mut(queue).ok_or_else(|| BrokerError::QueueNotFound(queue.to_string()))?;
        q.purge();
        Ok(())
    }

    pub fn queue_message_count(&self, queue: &str) -> usize {
        self.queues.get(queue).map(Queue::message_count).unwrap_or(0)
    }

    pub fn queue_consumer_count(&self, queue: &str) -> usize {
        self.queues.get(queue).map(Queue::consumer_count).unwrap_or(0)
    }

    /// Snapshot current topology and queue contents. When `durable_only` is
    /// set, only durable queues and their persistent messages are included
    /// (this is what `recover` expects).
    pub fn get_state(&self, durable_only: bool) -> BrokerSnapshot {
        let exchanges = self
            .exchanges
            .values()
            .map(|e| ExchangeSnapshot { name: e.name.clone(), kind: e.kind })
            .collect();
        let bindings = self.bindings.clone();
        let queues = self
            .queues
            .values()
            .filter(|q| !durable_only || q.options.durable)
            .map(|q| {
                let mut messages: Vec<Message> = q
                    .unacked
                    .iter()
                    .map(|(_, m)| {
                        let mut m = m.clone();
                        m.redelivered = true;
                        m
                    })
                    .chain(q.messages.iter().cloned())
                    .filter(|m| !durable_only || m.persistent)
                    .collect();
                messages.sort_by_key(|m| m.timestamp_ms);
                QueueSnapshot {
                    name: q.name.clone(),
                    durable: q.options.durable,
                    auto_delete: q.options.auto_delete,
                    messages,
                }
            })
            .collect();
        BrokerSnapshot { exchanges, bindings, queues }
    }

    /// Restore topology and queue contents from a snapshot into a fresh
    /// broker. Consumers are not restored; the owning activity must
    /// re-subscribe after recover, at which point pending messages are
    /// delivered as usual.
    pub fn recover(&mut self, snapshot: BrokerSnapshot) {
        self.exchanges.clear();
        self.queues.clear();
        self.bindings.clear();
        self.consumers.clear();

        for e in snapshot.exchanges {
            self.exchanges.insert(e.name.clone(), Exchange { name: e.name, kind: e.kind });
        }
        for b in snapshot.bindings {
            self.bindings.push(b);
        }
        for qs in snapshot.queues {
            let mut queue = Queue::new(
                qs.name.clone(),
                QueueOptions { durable: qs.durable, auto_delete: qs.auto_delete },
            );
            queue.messages.extend(qs.messages);
            self.queues.insert(qs.name, queue);
        }
        tracing::info!("broker recovered from snapshot");
    }
}

#[cfg(test)]
#[path = "broker_tests.rs"]
mod tests;
