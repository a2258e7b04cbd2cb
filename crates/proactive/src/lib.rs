// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The proactive trigger runtime: heartbeat/cron/webhook rules that enqueue
//! jobs on a schedule, deduped against in-flight runs and backed off after
//! repeated failures.

mod cron_expr;
mod error;
mod rule;
mod runtime;

pub use cron_expr::CronExprError;
pub use error::ProactiveError;
pub use rule::{
    CronRule, DeliveryMode, HeartbeatRule, ProactiveConfig, SessionTarget, Target, WakeMode,
    WebhookRule, DEFAULT_WEBHOOK_PAYLOAD_MAX_CHARS, MAX_HEARTBEAT_EVERY_SECONDS,
    MIN_HEARTBEAT_EVERY_SECONDS, MIN_WEBHOOK_SECRET_CHARS,
};
pub use runtime::{trigger_key, ConfigSink, EnqueueOutcome, EnqueueStatus, ProactiveRuntime};
