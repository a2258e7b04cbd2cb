// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! oj-core: shared job/event/admin types for the orchestrator control plane.
//!
//! This crate owns no I/O — it is the vocabulary the store (`oj-storage`),
//! proactive runtime (`oj-proactive`), model router (`oj-routing`), tool
//! policy (`oj-policy`), daemon (`oj-daemon`), and worker (`oj-worker`)
//! crates all build on.

pub mod admin;
pub mod clock;
pub mod error;
pub mod id;
pub mod job;
pub mod macros;

pub use admin::AdminState;
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{JobStateError, ValidationError};
pub use id::{short, IdBuf};
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{
    CreateJobRequest, Job, JobEvent, JobEventType, JobId, JobKind, JobStatus, MAX_ERROR_CHARS,
    MAX_EVENTS_PER_JOB, MAX_EVENT_MESSAGE_CHARS, MAX_METADATA_VALUE_CHARS, MAX_PROMPT_CHARS,
    MAX_RESULT_TEXT_CHARS, MAX_SESSION_KEY_CHARS,
};
