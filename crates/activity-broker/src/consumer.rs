// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use activity_core::ConsumerTag;

#[derive(Clone, Copy, Debug, Default)]
pub struct ConsumeOptions {
    pub no_ack: bool,
    pub exclusive: bool,
    /// 0 means unbounded.
    pub prefetch: usize,
    /// `assertConsumer` registrations are durable and survive `recover`;
    /// `subscribeTmp` registrations do not.
    pub durable: bool,
    /// Use a caller-chosen tag (e.g. a fixed role name like `_activity-run`)
    /// instead of a freshly generated one.
    pub tag: Option<ConsumerTag>,
}

#[derive(Debug, Clone)]
pub struct ConsumerInfo {
    pub tag: ConsumerTag,
    pub queue: String,
    pub options: ConsumeOptions,
}
