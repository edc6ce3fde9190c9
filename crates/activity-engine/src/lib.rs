// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity Runtime Core: the BPMN-style activity state machine, its
//! in-process message broker wiring, and the collaborators (evaluator,
//! inbound join buffer, formatter, behaviour) it drives through one run.

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

pub mod activity;
pub mod behaviour;
pub mod compensation;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod evaluator;
pub mod execution_bridge;
pub mod formatter;
pub mod inbound;
pub mod model;
pub mod run_content;
pub mod shake;

pub use activity::{Activity, ActivitySnapshot};
pub use behaviour::{Behaviour, ExecuteMessage, ExecutionPublisher};
pub use config::EngineOptions;
pub use error::{ActivityError, EngineError};
pub use evaluator::{FlowAction, OutboundResult};
pub use formatter::{Extension, FormatOutcome, Formatter, PassthroughFormatter};
pub use inbound::{InboundMessage, JoinBuffer, JoinDecision};
pub use model::{ActivityFlags, Condition, Counters, DeclaredProperties, ExecutionState, SequenceFlowDefinition, Status, Trigger};
pub use run_content::RunContent;
pub use shake::{ShakeStep, ShakeTrail};
