// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drains one attempt's `PromptEvent` stream: batches text deltas into a
//! single `agent_text_delta` event per flush interval, forwards tool
//! start/end as they arrive (flushing any pending text first so event
//! order on the job's log matches wall-clock order), and evaluates tool
//! policy inline so a denied tool never reaches the job's event log as
//! `tool_start`.
//!
//! Also tallies whether this attempt produced any output or tool activity
//! at all, independent of whether the prompt ultimately succeeded or
//! errored — §4.6's fallback guard needs this even on a mid-stream failure,
//! which is exactly when `oj_rpc::RpcSession::run_prompt` discards its own
//! partial `PromptOutcome`.

use std::time::Duration;

use oj_core::{Clock, JobEventType, JobId, JobKind};
use oj_policy::ToolPolicyRuntime;
use oj_rpc::{PromptEvent, RpcSession};
use tokio::sync::mpsc;

use crate::client::ControlClient;

/// Tally produced by draining one attempt's event stream, independent of
/// whatever `run_prompt` itself returns.
#[derive(Debug, Default, Clone)]
pub struct AttemptEventOutcome {
    pub had_output: bool,
    pub had_tool_activity: bool,
    /// Set the first time a tool invocation is denied by policy. The
    /// attempt is not retryable once this is set (§7).
    pub policy_denied: Option<String>,
}

async fn post_event(
    client: &ControlClient,
    job_id: &JobId,
    clock: &impl Clock,
    event_type: JobEventType,
    message: Option<String>,
    data: Option<serde_json::Value>,
) {
    let mut event = oj_core::JobEvent::new(event_type, clock);
    if let Some(message) = message {
        event = event.with_message(message);
    }
    if let Some(data) = data {
        event = event.with_data(data);
    }
    if let Err(err) = client.post_event(job_id, &event).await {
        tracing::warn!(%job_id, error = %err, "failed to post worker event");
    }
}

async fn flush_buffer(buffer: &mut String, client: &ControlClient, job_id: &JobId, clock: &impl Clock) {
    if buffer.is_empty() {
        return;
    }
    let delta = std::mem::take(buffer);
    post_event(
        client,
        job_id,
        clock,
        JobEventType::AgentTextDelta,
        None,
        Some(serde_json::json!({ "delta": delta })),
    )
    .await;
}

#[allow(clippy::too_many_arguments)]
pub async fn drain_events(
    mut rx: mpsc::Receiver<PromptEvent>,
    client: &ControlClient,
    job_id: &JobId,
    clock: &impl Clock,
    policy: Option<&ToolPolicyRuntime>,
    kind: JobKind,
    profile_id: &str,
    session: &RpcSession,
    flush_interval: Duration,
) -> AttemptEventOutcome {
    let mut buffer = String::new();
    let mut outcome = AttemptEventOutcome::default();
    let mut interval = tokio::time::interval(flush_interval);
    interval.tick().await; // first tick fires immediately; consume it so flushes start one interval out

    loop {
        tokio::select! {
            biased;
            event = rx.recv() => {
                match event {
                    Some(PromptEvent::TextDelta(delta)) => {
                        outcome.had_output = true;
                        buffer.push_str(&delta);
                    }
                    Some(PromptEvent::ToolStart(name)) => {
                        flush_buffer(&mut buffer, client, job_id, clock).await;
                        if let Some(decision) = policy.map(|p| p.evaluate(&name, kind, Some(profile_id))) {
                            if !decision.allowed {
                                let reason = format!("policy denied tool={name} reason={}", decision.reason);
                                post_event(client, job_id, clock, JobEventType::Log, Some(reason.clone()), None).await;
                                let _ = session.abort().await;
                                outcome.policy_denied = Some(reason);
                                continue;
                            }
                        }
                        outcome.had_tool_activity = true;
                        post_event(
                            client,
                            job_id,
                            clock,
                            JobEventType::ToolStart,
                            None,
                            Some(serde_json::json!({ "toolName": name })),
                        )
                        .await;
                    }
                    Some(PromptEvent::ToolEnd(name)) => {
                        post_event(
                            client,
                            job_id,
                            clock,
                            JobEventType::ToolEnd,
                            None,
                            Some(serde_json::json!({ "toolName": name })),
                        )
                        .await;
                    }
                    Some(PromptEvent::AgentEnd) => {}
                    None => {
                        flush_buffer(&mut buffer, client, job_id, clock).await;
                        break;
                    }
                }
            }
            _ = interval.tick() => {
                flush_buffer(&mut buffer, client, job_id, clock).await;
            }
        }
    }

    outcome
}
