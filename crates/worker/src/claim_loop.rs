// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker claim loop (§4.4): poll for a job, drive it to a terminal
//! report, repeat. One job is in flight at a time per worker process.

use std::sync::Arc;
use std::time::Duration;

use oj_core::{Clock, Job, JobId};
use oj_policy::ToolPolicyRuntime;
use oj_routing::{FallbackInput, ModelRoutingRuntime};

use crate::abort::AbortSlot;
use crate::attempt::{self, AttemptOutcome};
use crate::client::ControlClient;
use crate::config::{self, ExecMode};
use crate::heartbeat;
use crate::mock::{self, MockResult};

enum JobOutcome {
    Complete(Option<String>),
    Aborted,
    Failed(String),
}

pub struct Worker<C: Clock> {
    pub client: Arc<ControlClient>,
    pub routing: Arc<ModelRoutingRuntime<C>>,
    pub policy: Option<Arc<ToolPolicyRuntime>>,
    pub clock: C,
    pub worker_id: String,
    pub poll_interval: Duration,
    pub heartbeat_interval: Duration,
    pub flush_interval: Duration,
    pub exec_mode: ExecMode,
}

impl<C: Clock + 'static> Worker<C> {
    /// Runs the claim loop until `shutdown` resolves.
    pub async fn run(&self, shutdown: impl std::future::Future<Output = ()>) {
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("worker claim loop shutting down");
                    return;
                }
                claimed = self.client.claim(&self.worker_id) => {
                    match claimed {
                        Ok(Some(job)) => self.handle_job(job).await,
                        Ok(None) => tokio::time::sleep(self.poll_interval).await,
                        Err(err) => {
                            tracing::warn!(error = %err, "claim request failed");
                            tokio::time::sleep(self.poll_interval).await;
                        }
                    }
                }
            }
        }
    }

    async fn handle_job(&self, job: Job) {
        tracing::info!(job_id = %job.id, kind = %job.kind, "claimed job");
        let abort_slot = Arc::new(AbortSlot::new());
        abort_slot.reset_for_job();

        let heartbeat_handle = heartbeat::spawn(
            self.client.clone(),
            self.clock.clone(),
            job.id,
            abort_slot.clone(),
            self.heartbeat_interval,
        );

        let outcome = match self.exec_mode {
            ExecMode::Mock => match mock::run(&self.client, &self.clock, &job, &abort_slot).await {
                MockResult::Completed(text) => JobOutcome::Complete(Some(text)),
                MockResult::Aborted => JobOutcome::Aborted,
            },
            ExecMode::Rpc => self.run_rpc_job(&job, &abort_slot).await,
        };

        heartbeat_handle.abort();
        self.report(&job.id, outcome).await;
    }

    async fn run_rpc_job(&self, job: &Job, abort_slot: &AbortSlot) -> JobOutcome {
        let plan = match self.routing.build_plan(job) {
            Ok(plan) => plan,
            Err(err) => return JobOutcome::Failed(err.to_string()),
        };
        if plan.profiles.is_empty() {
            return JobOutcome::Failed("no model profile available for this job's route chain".to_string());
        }

        let max_attempts =
            (plan.max_attempts as usize).min(plan.profiles.len()).min(config::MAX_ATTEMPTS_PER_JOB_CAP as usize);

        for (index, profile_id) in plan.profiles.iter().take(max_attempts).enumerate() {
            if abort_slot.is_abort_requested() {
                return JobOutcome::Aborted;
            }

            tracing::info!(job_id = %job.id, profile_id, attempt = index + 1, "starting attempt");
            let attempt_result = attempt::run_attempt(
                &self.routing,
                self.policy.as_deref(),
                &self.client,
                &self.clock,
                job,
                profile_id,
                abort_slot,
                self.flush_interval,
            )
            .await;

            let attempt: AttemptOutcome = match attempt_result {
                Ok(attempt) => attempt,
                Err(err) => AttemptOutcome { error: Some(err.to_string()), ..Default::default() },
            };

            if let Some(reason) = attempt.policy_denied {
                return JobOutcome::Failed(reason);
            }

            if abort_slot.is_abort_requested() {
                return JobOutcome::Aborted;
            }

            match attempt.error {
                None => {
                    self.routing.mark_success(profile_id);
                    let result_text = if attempt.text.is_empty() { None } else { Some(attempt.text) };
                    return JobOutcome::Complete(result_text);
                }
                Some(error_message) => {
                    let decision = self.routing.evaluate_fallback(
                        profile_id,
                        FallbackInput {
                            abort_requested: false,
                            attempt_had_output: attempt.had_output,
                            attempt_had_tool_activity: attempt.had_tool_activity,
                            error_message: Some(error_message.clone()),
                        },
                    );
                    tracing::warn!(
                        job_id = %job.id,
                        profile_id,
                        fallback = decision.fallback,
                        reason = decision.reason,
                        error = error_message,
                        "attempt failed"
                    );
                    if decision.fallback && index + 1 < max_attempts {
                        continue;
                    }
                    return JobOutcome::Failed(error_message);
                }
            }
        }

        JobOutcome::Failed("exhausted model route chain without a successful attempt".to_string())
    }

    async fn report(&self, job_id: &JobId, outcome: JobOutcome) {
        let result = match outcome {
            JobOutcome::Complete(text) => self.client.complete(job_id, text).await.map(|_| ()),
            JobOutcome::Aborted => self.client.aborted(job_id, None).await.map(|_| ()),
            JobOutcome::Failed(error) => self.client.fail(job_id, &error).await.map(|_| ()),
        };
        if let Err(err) = result {
            tracing::error!(%job_id, error = %err, "failed to report terminal job outcome");
        }
    }
}
