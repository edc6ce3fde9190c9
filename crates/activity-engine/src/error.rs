// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use activity_broker::BrokerError;
use thiserror::Error;

pub use activity_core::ActivityError;

/// Programmer-error conditions: violations of the activity's own lifecycle
/// contract, signalled by returning an `Err` rather than routed through the
/// broker.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("activity is already running")]
    AlreadyRunning,

    #[error("cannot recover while running")]
    RecoverWhileRunning,

    #[error("cannot resume while already consuming")]
    ResumeWhileConsuming,

    #[error(transparent)]
    Broker(#[from] BrokerError),
}
