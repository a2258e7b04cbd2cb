// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mock exec mode (`PI_EXEC_MODE=mock`): a deterministic four-step
//! sequence standing in for a real agent process, for demos and tests that
//! don't have a `pi` binary available. No RPC session, no model routing,
//! no fallback — just the claim loop's heartbeat/abort wiring exercised
//! against a scripted attempt.

use std::time::Duration;

use oj_core::{Clock, Job, JobEventType, JobId};

use crate::abort::AbortSlot;
use crate::client::ControlClient;

pub enum MockResult {
    Completed(String),
    Aborted,
}

const STEP_DELAY: Duration = Duration::from_millis(50);

async fn post(client: &ControlClient, job_id: &JobId, clock: &impl Clock, event_type: JobEventType, data: serde_json::Value) {
    let event = oj_core::JobEvent::new(event_type, clock).with_data(data);
    if let Err(err) = client.post_event(job_id, &event).await {
        tracing::warn!(%job_id, error = %err, "failed to post mock worker event");
    }
}

async fn post_delta(client: &ControlClient, job_id: &JobId, clock: &impl Clock, delta: &str) {
    post(client, job_id, clock, JobEventType::AgentTextDelta, serde_json::json!({ "delta": delta })).await;
}

pub async fn run(client: &ControlClient, clock: &impl Clock, job: &Job, abort_slot: &AbortSlot) -> MockResult {
    let prompt_preview: String = job.prompt.chars().take(60).collect();
    let steps: [(&str, &str); 4] = [
        ("plan", "Planning a response to the request.\n"),
        ("read_context", "Reviewing session context.\n"),
        ("execute", "Synthesizing a reply.\n"),
        ("finalize", ""),
    ];

    let mut buffer = String::new();
    for (tool, text) in steps {
        if abort_slot.is_abort_requested() {
            return MockResult::Aborted;
        }
        post(client, &job.id, clock, JobEventType::ToolStart, serde_json::json!({ "toolName": tool })).await;
        tokio::time::sleep(STEP_DELAY).await;
        if !text.is_empty() {
            post_delta(client, &job.id, clock, text).await;
            buffer.push_str(text);
        }
        post(client, &job.id, clock, JobEventType::ToolEnd, serde_json::json!({ "toolName": tool })).await;
        if abort_slot.is_abort_requested() {
            return MockResult::Aborted;
        }
    }

    let result = format!("{buffer}Mock completion for: {prompt_preview}");
    MockResult::Completed(result)
}
