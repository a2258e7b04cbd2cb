// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Drives one model-profile attempt at a job's prompt end to end: acquire
//! the profile's RPC session, run the prompt while draining its event
//! stream (§4.4 steps 3-4), and report back everything the claim loop
//! needs to decide completion, fallback, or failure.

use std::time::Duration;

use oj_core::{Clock, Job};
use oj_policy::ToolPolicyRuntime;
use oj_routing::ModelRoutingRuntime;

use crate::abort::AbortSlot;
use crate::client::ControlClient;
use crate::delta::drain_events;
use crate::error::WorkerError;

/// Everything the claim loop needs after one attempt, whether it
/// succeeded, errored, or was denied by policy.
#[derive(Debug, Default)]
pub struct AttemptOutcome {
    pub text: String,
    pub had_output: bool,
    pub had_tool_activity: bool,
    pub policy_denied: Option<String>,
    pub error: Option<String>,
}

#[allow(clippy::too_many_arguments)]
pub async fn run_attempt<C: Clock>(
    routing: &ModelRoutingRuntime<C>,
    policy: Option<&ToolPolicyRuntime>,
    client: &ControlClient,
    clock: &C,
    job: &Job,
    profile_id: &str,
    abort_slot: &AbortSlot,
    flush_interval: Duration,
) -> Result<AttemptOutcome, WorkerError> {
    let session = routing.get_session(profile_id, &job.session_key).await?;
    abort_slot.set_session(session.clone());

    let (tx, rx) = tokio::sync::mpsc::channel(256);
    let prompt_fut = session.run_prompt(&job.prompt, tx);
    let drain_fut =
        drain_events(rx, client, &job.id, clock, policy, job.kind, profile_id, &session, flush_interval);

    let (prompt_result, event_outcome) = tokio::join!(prompt_fut, drain_fut);
    abort_slot.clear_session();

    let mut outcome = AttemptOutcome {
        had_output: event_outcome.had_output,
        had_tool_activity: event_outcome.had_tool_activity,
        policy_denied: event_outcome.policy_denied,
        ..Default::default()
    };

    match prompt_result {
        Ok(prompt_outcome) => {
            outcome.text = if !prompt_outcome.text.is_empty() { prompt_outcome.text } else { String::new() };
        }
        Err(err) => {
            outcome.error = Some(err.to_string());
        }
    }

    Ok(outcome)
}
