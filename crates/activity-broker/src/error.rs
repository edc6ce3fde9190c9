// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("exchange not found: {0}")]
    ExchangeNotFound(String),

    #[error("queue not found: {0}")]
    QueueNotFound(String),

    #[error("no queue bound to exchange {exchange} matches routing key {routing_key}")]
    NoMatchingQueue { exchange: String, routing_key: String },

    #[error("unknown consumer tag: {0}")]
    UnknownConsumerTag(String),

    #[error("queue {0} already has an exclusive consumer")]
    ExclusiveConsumerExists(String),

    #[error("unknown delivery tag on queue {queue}: {message_id}")]
    UnknownDeliveryTag { queue: String, message_id: String },
}
