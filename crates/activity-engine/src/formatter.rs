// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Formatter / Extensions hook: may rewrite a run message's content before
//! a transition proceeds, and is activated/deactivated alongside the run.

use serde_json::Value;

/// Outcome of one poll of the formatter chain.
pub enum FormatOutcome {
    /// The chain is done; `content` is the (possibly rewritten) message body.
    Complete(Value),
    /// The chain is still waiting on an async fragment; the caller should
    /// leave `status = formatting` and poll again later.
    Pending,
}

/// A chain of content-rewriting fragments fed by `format-run-q`.
///
/// The default implementation ([`PassthroughFormatter`]) never amends
/// anything and always completes synchronously.
pub trait Formatter: Send {
    fn start(&mut self, content: Value);
    fn poll(&mut self) -> FormatOutcome;
}

#[derive(Debug, Default)]
pub struct PassthroughFormatter {
    content: Option<Value>,
}

impl Formatter for PassthroughFormatter {
    fn start(&mut self, content: Value) {
        self.content = Some(content);
    }

    fn poll(&mut self) -> FormatOutcome {
        FormatOutcome::Complete(self.content.take().unwrap_or(Value::Null))
    }
}

/// Lifecycle hook activated on `run.enter` and deactivated on `run.leave`.
/// Distinct from [`Formatter`]: extensions observe the run, they don't
/// rewrite its content.
pub trait Extension: Send {
    fn activate(&mut self) {}
    fn deactivate(&mut self) {}
}

impl Extension for () {}

#[cfg(test)]
#[path = "formatter_tests.rs"]
mod tests;
