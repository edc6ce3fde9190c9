// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use activity_broker::{Broker, ExchangeKind, QueueOptions};
use activity_core::FakeClock;
use serde_json::json;

struct EchoBehaviour;
impl Behaviour<FakeClock> for EchoBehaviour {
    fn execute(&mut self, message: &ExecuteMessage, out: &mut ExecutionPublisher<'_, FakeClock>) {
        out.completed(message.content.clone());
    }
}

fn broker_with_execution_queue() -> Broker<FakeClock> {
    let mut broker = Broker::new(FakeClock::new());
    broker.assert_exchange(EXECUTION_EXCHANGE, ExchangeKind::Topic);
    broker.assert_queue(EXECUTION_QUEUE, QueueOptions { durable: false, auto_delete: false });
    broker.bind_queue(EXECUTION_QUEUE, EXECUTION_EXCHANGE, "execute.#").unwrap();
    broker
}

#[test]
fn synchronous_behaviour_publishes_completion_immediately() {
    let mut broker = broker_with_execution_queue();
    let execution_id = ExecutionId::new();
    let message = ExecuteMessage { execution_id, parent: None, content: json!({"x": 1}) };

    let mut behaviour = EchoBehaviour;
    {
        let mut out = ExecutionPublisher::new(&mut broker, execution_id);
        behaviour.execute(&message, &mut out);
    }

    let tag = broker.assert_consumer(EXECUTION_QUEUE, Default::default()).unwrap();
    let delivery = broker.consume_next(tag).unwrap().expect("completion published");
    assert_eq!(delivery.message.routing_key, "execute.completed");
}

#[test]
fn default_discard_publishes_discard_message() {
    let mut broker = broker_with_execution_queue();
    let execution_id = ExecutionId::new();
    let mut behaviour = EchoBehaviour;
    {
        let mut out = ExecutionPublisher::new(&mut broker, execution_id);
        behaviour.discard(&mut out);
    }
    let tag = broker.assert_consumer(EXECUTION_QUEUE, Default::default()).unwrap();
    let delivery = broker.consume_next(tag).unwrap().expect("discard published");
    assert_eq!(delivery.message.routing_key, "execute.discard");
}
