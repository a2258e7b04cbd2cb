// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identifier, state machine, and event log entry types.

use crate::clock::Clock;
use crate::error::{JobStateError, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_id! {
    /// Unique identifier for a job instance.
    pub struct JobId("job-");
}

pub const MAX_PROMPT_CHARS: usize = 20_000;
pub const MAX_SESSION_KEY_CHARS: usize = 256;
pub const MAX_METADATA_VALUE_CHARS: usize = 2_000;
pub const MAX_RESULT_TEXT_CHARS: usize = 2_000_000;
pub const MAX_ERROR_CHARS: usize = 8_000;
pub const MAX_EVENT_MESSAGE_CHARS: usize = 4_000;
pub const MAX_EVENTS_PER_JOB: usize = 5_000;

/// `kind` discriminant for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Task,
    Run,
}

crate::simple_display! {
    JobKind {
        Task => "task",
        Run => "run",
    }
}

/// Job status. Transitions form a DAG; terminal statuses never re-emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    NeedsApproval,
    Queued,
    Running,
    Aborting,
    Aborted,
    Completed,
    Failed,
}

crate::simple_display! {
    JobStatus {
        NeedsApproval => "needs_approval",
        Queued => "queued",
        Running => "running",
        Aborting => "aborting",
        Aborted => "aborted",
        Completed => "completed",
        Failed => "failed",
    }
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Aborted | JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether `self -> next` is a legal edge in the job DAG.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (NeedsApproval, Queued)
                | (NeedsApproval, Aborted)
                | (Queued, Running)
                | (Queued, Aborted)
                | (Running, Aborting)
                | (Running, Completed)
                | (Running, Failed)
                | (Running, Aborted)
                | (Aborting, Aborted)
        )
    }
}

/// Request body for [`crate::job::Job::new`] / `createJob`.
#[derive(Debug, Clone)]
pub struct CreateJobRequest {
    pub kind: JobKind,
    pub prompt: String,
    pub channel: String,
    pub chat_id: String,
    pub thread_id: Option<String>,
    pub requester_id: String,
    pub session_key: String,
    pub requires_approval: bool,
    pub metadata: HashMap<String, String>,
}

impl CreateJobRequest {
    /// Field-level validation of the size invariants. Never mutates state;
    /// the store rejects the whole request on the first failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.prompt.is_empty() {
            return Err(ValidationError::new("prompt", "must not be empty"));
        }
        if self.prompt.chars().count() > MAX_PROMPT_CHARS {
            return Err(ValidationError::new(
                "prompt",
                format!("must be at most {MAX_PROMPT_CHARS} chars"),
            ));
        }
        if self.chat_id.is_empty() {
            return Err(ValidationError::new("chatId", "must not be empty"));
        }
        if self.requester_id.is_empty() {
            return Err(ValidationError::new("requesterId", "must not be empty"));
        }
        if self.session_key.chars().count() > MAX_SESSION_KEY_CHARS {
            return Err(ValidationError::new(
                "sessionKey",
                format!("must be at most {MAX_SESSION_KEY_CHARS} chars"),
            ));
        }
        for (key, value) in &self.metadata {
            if value.chars().count() > MAX_METADATA_VALUE_CHARS {
                return Err(ValidationError::new(
                    format!("metadata.{key}"),
                    format!("must be at most {MAX_METADATA_VALUE_CHARS} chars"),
                ));
            }
        }
        Ok(())
    }
}

/// A unit of work submitted by a user or a proactive trigger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    pub status: JobStatus,
    pub prompt: String,
    pub channel: String,
    pub chat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    pub requester_id: String,
    pub session_key: String,
    pub requires_approval: bool,
    #[serde(default)]
    pub abort_requested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Build a new job from a validated request. Status is `needs_approval`
    /// when `requires_approval`, `queued` otherwise.
    pub fn new(id: JobId, req: CreateJobRequest, clock: &impl Clock) -> Self {
        let now = clock.now_utc();
        let status = if req.requires_approval {
            JobStatus::NeedsApproval
        } else {
            JobStatus::Queued
        };
        Self {
            id,
            kind: req.kind,
            status,
            prompt: req.prompt,
            channel: req.channel,
            chat_id: req.chat_id,
            thread_id: req.thread_id,
            requester_id: req.requester_id,
            session_key: req.session_key,
            requires_approval: req.requires_approval,
            abort_requested: false,
            worker_id: None,
            metadata: req.metadata,
            result_text: None,
            error: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            finished_at: None,
        }
    }

    /// Attempt a status transition, validating it against the DAG.
    /// On success, bumps `updated_at`; callers append the matching event.
    pub fn transition(
        &mut self,
        next: JobStatus,
        clock: &impl Clock,
    ) -> Result<(), JobStateError> {
        if self.status.is_terminal() {
            return Err(JobStateError::AlreadyTerminal {
                id: self.id.to_string(),
                status: self.status,
            });
        }
        if !self.status.can_transition_to(next) {
            return Err(JobStateError::InvalidTransition {
                id: self.id.to_string(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = clock.now_utc();
        if next.is_terminal() {
            self.finished_at = Some(self.updated_at);
        }
        Ok(())
    }

    pub fn metadata_eq(&self, key: &str, value: &str) -> bool {
        self.metadata.get(key).map(|v| v.as_str()) == Some(value)
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct JobBuilder {
    id: JobId,
    kind: JobKind,
    status: JobStatus,
    prompt: String,
    channel: String,
    chat_id: String,
    thread_id: Option<String>,
    requester_id: String,
    session_key: String,
    requires_approval: bool,
    metadata: HashMap<String, String>,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for JobBuilder {
    fn default() -> Self {
        Self {
            id: JobId::new(),
            kind: JobKind::Task,
            status: JobStatus::Queued,
            prompt: "hello".to_string(),
            channel: "test".to_string(),
            chat_id: "C1".to_string(),
            thread_id: None,
            requester_id: "U1".to_string(),
            session_key: "S1".to_string(),
            requires_approval: false,
            metadata: HashMap::new(),
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl JobBuilder {
    pub fn kind(mut self, kind: JobKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    pub fn requires_approval(mut self, v: bool) -> Self {
        self.requires_approval = v;
        self
    }

    pub fn session_key(mut self, v: impl Into<String>) -> Self {
        self.session_key = v.into();
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn build(self, clock: &impl Clock) -> Job {
        let mut job = Job::new(
            self.id,
            CreateJobRequest {
                kind: self.kind,
                prompt: self.prompt,
                channel: self.channel,
                chat_id: self.chat_id,
                thread_id: self.thread_id,
                requester_id: self.requester_id,
                session_key: self.session_key,
                requires_approval: self.requires_approval,
                metadata: self.metadata,
            },
            clock,
        );
        job.status = self.status;
        job
    }
}

/// Event type discriminants appended to a job's event log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobEventType {
    JobCreated,
    JobApproved,
    JobStarted,
    AgentTextDelta,
    ToolStart,
    ToolEnd,
    Log,
    JobFinished,
    JobFailed,
    JobAborted,
}

crate::simple_display! {
    JobEventType {
        JobCreated => "job_created",
        JobApproved => "job_approved",
        JobStarted => "job_started",
        AgentTextDelta => "agent_text_delta",
        ToolStart => "tool_start",
        ToolEnd => "tool_end",
        Log => "log",
        JobFinished => "job_finished",
        JobFailed => "job_failed",
        JobAborted => "job_aborted",
    }
}

/// A single append-only entry in a job's event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    #[serde(rename = "type")]
    pub event_type: JobEventType,
    pub ts: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JobEvent {
    pub fn new(event_type: JobEventType, clock: &impl Clock) -> Self {
        Self {
            event_type,
            ts: clock.now_utc(),
            message: None,
            data: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.chars().count() > MAX_EVENT_MESSAGE_CHARS {
            message = message.chars().take(MAX_EVENT_MESSAGE_CHARS).collect();
        }
        self.message = Some(message);
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    /// The delta string carried by an `agent_text_delta` event, if any
    /// (used by the store to append to `Job::result_text`).
    pub fn text_delta(&self) -> Option<&str> {
        if self.event_type != JobEventType::AgentTextDelta {
            return None;
        }
        self.data.as_ref()?.get("delta")?.as_str()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
