// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The proactive ticker: evaluates heartbeat/cron rules, dedupes and
//! backs off against the job store, and answers webhook ingress requests.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use oj_core::{Clock, CreateJobRequest, JobId, JobKind, JobStatus};
use oj_storage::JobStore;
use parking_lot::Mutex;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

use crate::cron_expr::CronFields;
use crate::error::ProactiveError;
use crate::rule::{CronRule, DeliveryMode, ProactiveConfig, SessionTarget, Target, WakeMode};

const MAX_PROMPT_CHARS: usize = 20_000;
const TRUNCATION_SUFFIX: &str = "...[truncated]";
const BACKOFF_SCHEDULE_SECONDS: [i64; 5] = [30, 60, 300, 900, 3_600];

/// Persists a canonicalized [`ProactiveConfig`] to whatever backs it (a
/// JSON file, in the real daemon). Mutations never commit in memory unless
/// this succeeds.
pub trait ConfigSink: Send + Sync {
    fn persist(&self, config: &ProactiveConfig) -> std::io::Result<()>;
}

impl<F: Fn(&ProactiveConfig) -> std::io::Result<()> + Send + Sync> ConfigSink for F {
    fn persist(&self, config: &ProactiveConfig) -> std::io::Result<()> {
        self(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueStatus {
    Enqueued,
    DuplicateActiveJob,
    BackoffBlocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnqueueOutcome {
    pub status: EnqueueStatus,
    pub job_id: Option<JobId>,
}

pub fn trigger_key(kind: &str, rule_id: &str) -> String {
    format!("{kind}:{rule_id}")
}

#[derive(Default)]
struct FailureTracking {
    streak: u32,
    last_seen_terminal: Option<JobId>,
}

pub struct ProactiveRuntime<C: Clock> {
    clock: C,
    store: Arc<JobStore<C>>,
    sink: Arc<dyn ConfigSink>,
    config: Mutex<ProactiveConfig>,
    heartbeat_next_due: Mutex<HashMap<String, chrono::DateTime<Utc>>>,
    cron_interval_next_due: Mutex<HashMap<String, chrono::DateTime<Utc>>>,
    cron_last_fired_minute: Mutex<HashMap<String, String>>,
    pending_wake: Mutex<HashMap<String, bool>>,
    failures: Mutex<HashMap<String, FailureTracking>>,
}

impl<C: Clock> ProactiveRuntime<C> {
    pub fn new(config: ProactiveConfig, store: Arc<JobStore<C>>, clock: C, sink: Arc<dyn ConfigSink>) -> Self {
        Self {
            clock,
            store,
            sink,
            config: Mutex::new(config),
            heartbeat_next_due: Mutex::new(HashMap::new()),
            cron_interval_next_due: Mutex::new(HashMap::new()),
            cron_last_fired_minute: Mutex::new(HashMap::new()),
            pending_wake: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> ProactiveConfig {
        self.config.lock().clone()
    }

    /// One scheduler pass: heartbeats, then main-session wake resume, then
    /// cron rules. Call on a fixed interval (`config.tick_ms`).
    pub fn tick(&self) {
        let config = self.config.lock().clone();
        if !config.enabled {
            return;
        }

        let mut any_heartbeat_fired = false;
        for rule in &config.heartbeat_rules {
            let now = self.clock.now_utc();
            let due_at = {
                let mut next_due = self.heartbeat_next_due.lock();
                *next_due.entry(rule.id.clone()).or_insert(now)
            };
            if now < due_at {
                continue;
            }
            let key = trigger_key("heartbeat", &rule.id);
            let outcome = self.try_enqueue(&key, "heartbeat", &rule.id, &rule.prompt, &rule.delivery, &rule.target, false, true);
            if outcome.status == EnqueueStatus::Enqueued {
                any_heartbeat_fired = true;
            }
            self.heartbeat_next_due
                .lock()
                .insert(rule.id.clone(), now + ChronoDuration::seconds(rule.every_seconds as i64));
        }

        if any_heartbeat_fired {
            for rule in &config.cron_rules {
                if rule.session_target == SessionTarget::Main && rule.wake_mode == WakeMode::NextHeartbeat {
                    self.resolve_pending_wake(rule);
                }
            }
        }

        for rule in &config.cron_rules {
            self.evaluate_cron_rule(rule);
        }
    }

    fn resolve_pending_wake(&self, rule: &CronRule) {
        let is_pending = self.pending_wake.lock().get(&rule.id).copied().unwrap_or(false);
        if !is_pending {
            return;
        }
        let key = trigger_key("cron", &rule.id);
        let outcome = self.try_enqueue(&key, "cron", &rule.id, &rule.prompt, &rule.delivery, &rule.target, false, true);
        if matches!(outcome.status, EnqueueStatus::Enqueued | EnqueueStatus::DuplicateActiveJob) {
            self.pending_wake.lock().insert(rule.id.clone(), false);
        }
    }

    fn evaluate_cron_rule(&self, rule: &CronRule) {
        if let Some(expr) = &rule.cron {
            self.evaluate_cron_expr(rule, expr);
        } else if let Some(every_seconds) = rule.every_seconds {
            self.evaluate_cron_interval(rule, every_seconds);
        } else if let Some(at) = rule.at {
            self.evaluate_cron_at(rule, at);
        }
    }

    fn evaluate_cron_expr(&self, rule: &CronRule, expr: &str) {
        let fields = match CronFields::parse(expr) {
            Ok(fields) => fields,
            Err(err) => {
                warn!(rule_id = %rule.id, error = %err, "cron rule has unparsable expression at tick time");
                return;
            }
        };
        let tz = rule.resolved_timezone();
        let now_tz = self.clock.now_utc().with_timezone(&tz);
        if !fields.matches(&now_tz) {
            return;
        }
        let minute_key = now_tz.format("%Y%m%d%H%M").to_string();
        {
            let mut last_fired = self.cron_last_fired_minute.lock();
            if last_fired.get(&rule.id) == Some(&minute_key) {
                return;
            }
            last_fired.insert(rule.id.clone(), minute_key);
        }

        if rule.session_target == SessionTarget::Main && rule.wake_mode == WakeMode::NextHeartbeat {
            self.pending_wake.lock().insert(rule.id.clone(), true);
            return;
        }
        let key = trigger_key("cron", &rule.id);
        self.try_enqueue(&key, "cron", &rule.id, &rule.prompt, &rule.delivery, &rule.target, false, true);
    }

    fn evaluate_cron_interval(&self, rule: &CronRule, every_seconds: u64) {
        let now = self.clock.now_utc();
        let due_at = {
            let mut next_due = self.cron_interval_next_due.lock();
            *next_due.entry(rule.id.clone()).or_insert(now)
        };
        if now < due_at {
            return;
        }
        let key = trigger_key("cron", &rule.id);
        self.try_enqueue(&key, "cron", &rule.id, &rule.prompt, &rule.delivery, &rule.target, false, true);
        self.cron_interval_next_due
            .lock()
            .insert(rule.id.clone(), now + ChronoDuration::seconds(every_seconds as i64));
    }

    fn evaluate_cron_at(&self, rule: &CronRule, at: chrono::DateTime<Utc>) {
        if self.clock.now_utc() < at {
            return;
        }
        let key = trigger_key("cron", &rule.id);
        let outcome = self.try_enqueue(&key, "cron", &rule.id, &rule.prompt, &rule.delivery, &rule.target, false, true);
        if outcome.status == EnqueueStatus::Enqueued {
            let mut config = self.config.lock();
            config.cron_rules.retain(|r| r.id != rule.id);
            if let Err(err) = self.sink.persist(&config) {
                warn!(rule_id = %rule.id, error = %err, "failed to persist removal of fired at-schedule rule");
            }
        }
    }

    /// Manual trigger for a cron rule: bypasses the schedule check
    /// entirely but still honors dedupe and (for `main`/`next-heartbeat`)
    /// session/wake resolution isn't meaningful for a one-off trigger, so
    /// this enqueues immediately regardless of `wakeMode`.
    pub fn trigger_cron_now(&self, id: &str) -> Result<EnqueueOutcome, ProactiveError> {
        let rule = {
            let config = self.config.lock();
            config.cron_rules.iter().find(|r| r.id == id).cloned().ok_or_else(|| ProactiveError::NotFound(id.to_string()))?
        };
        let key = trigger_key("cron", &rule.id);
        Ok(self.try_enqueue(&key, "cron", &rule.id, &rule.prompt, &rule.delivery, &rule.target, true, true))
    }

    pub fn trigger_heartbeat_now(&self, id: &str) -> Result<EnqueueOutcome, ProactiveError> {
        let rule = {
            let config = self.config.lock();
            config
                .heartbeat_rules
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| ProactiveError::NotFound(id.to_string()))?
        };
        let key = trigger_key("heartbeat", &rule.id);
        Ok(self.try_enqueue(&key, "heartbeat", &rule.id, &rule.prompt, &rule.delivery, &rule.target, true, true))
    }

    /// `POST /proactive/webhooks/:id` ingress. `None` header counts as a
    /// mismatch, same as a wrong one.
    pub fn handle_webhook(
        &self,
        id: &str,
        provided_secret: Option<&str>,
        payload: &serde_json::Value,
    ) -> Result<EnqueueOutcome, ProactiveError> {
        let (rule, max_chars) = {
            let config = self.config.lock();
            let rule = config.webhooks.iter().find(|w| w.id == id).cloned().ok_or_else(|| ProactiveError::NotFound(id.to_string()))?;
            (rule, config.webhook_payload_max_chars)
        };
        let provided = provided_secret.unwrap_or_default();
        let matches = provided.len() == rule.secret.len() && bool::from(provided.as_bytes().ct_eq(rule.secret.as_bytes()));
        if !matches {
            return Err(ProactiveError::NotFound(format!("webhook secret mismatch for {id}")));
        }

        let mut prompt = rule.prompt.clone();
        if rule.include_payload_in_prompt {
            let pretty = serde_json::to_string_pretty(payload).unwrap_or_default();
            if pretty.chars().count() > max_chars {
                let truncated: String = pretty.chars().take(max_chars).collect();
                prompt = format!("{prompt}\n{truncated}\n...[truncated]");
            } else {
                prompt = format!("{prompt}\n{pretty}");
            }
        }

        let key = trigger_key("webhook", &rule.id);
        Ok(self.try_enqueue(&key, "webhook", &rule.id, &prompt, &DeliveryMode::None, &rule.target, false, false))
    }

    pub fn upsert_heartbeat(&self, rule: crate::rule::HeartbeatRule) -> Result<(), ProactiveError> {
        let mut candidate = self.config.lock().clone();
        if let Some(existing) = candidate.heartbeat_rules.iter_mut().find(|r| r.id == rule.id) {
            *existing = rule;
        } else {
            candidate.heartbeat_rules.push(rule);
        }
        self.commit(candidate)
    }

    pub fn delete_heartbeat(&self, id: &str) -> Result<(), ProactiveError> {
        let mut candidate = self.config.lock().clone();
        candidate.heartbeat_rules.retain(|r| r.id != id);
        self.commit(candidate)?;
        self.heartbeat_next_due.lock().remove(id);
        Ok(())
    }

    pub fn upsert_cron(&self, rule: CronRule) -> Result<(), ProactiveError> {
        let mut candidate = self.config.lock().clone();
        if let Some(existing) = candidate.cron_rules.iter_mut().find(|r| r.id == rule.id) {
            *existing = rule;
        } else {
            candidate.cron_rules.push(rule);
        }
        self.commit(candidate)
    }

    pub fn delete_cron(&self, id: &str) -> Result<(), ProactiveError> {
        let mut candidate = self.config.lock().clone();
        candidate.cron_rules.retain(|r| r.id != id);
        self.commit(candidate)?;
        self.cron_interval_next_due.lock().remove(id);
        self.cron_last_fired_minute.lock().remove(id);
        self.pending_wake.lock().remove(id);
        Ok(())
    }

    fn commit(&self, candidate: ProactiveConfig) -> Result<(), ProactiveError> {
        candidate.validate()?;
        self.sink.persist(&candidate)?;
        *self.config.lock() = candidate;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn try_enqueue(
        &self,
        key: &str,
        kind: &str,
        rule_id: &str,
        prompt: &str,
        delivery: &DeliveryMode,
        target: &Target,
        manual: bool,
        backoff_eligible: bool,
    ) -> EnqueueOutcome {
        if self.store.has_active_job_by_metadata("proactiveTriggerKey", key) {
            return EnqueueOutcome { status: EnqueueStatus::DuplicateActiveJob, job_id: None };
        }
        if !manual && backoff_eligible {
            if let Some(blocked_until) = self.backoff_blocked_until(key) {
                if self.clock.now_utc() < blocked_until {
                    return EnqueueOutcome { status: EnqueueStatus::BackoffBlocked, job_id: None };
                }
            }
        }

        let (final_prompt, truncated) = truncate_prompt(prompt);
        let mut metadata = target.metadata.clone();
        metadata.insert("proactiveTriggerKind".to_string(), kind.to_string());
        metadata.insert("proactiveTriggerId".to_string(), rule_id.to_string());
        metadata.insert("proactiveTriggerKey".to_string(), key.to_string());
        metadata.insert("proactiveTriggeredAt".to_string(), self.clock.now_utc().to_rfc3339());
        if truncated {
            metadata.insert("proactivePromptTruncated".to_string(), "true".to_string());
        }
        match delivery {
            DeliveryMode::Announce => {
                metadata.insert("proactiveDeliveryMode".to_string(), "announce".to_string());
            }
            DeliveryMode::None => {
                metadata.insert("proactiveDeliveryMode".to_string(), "none".to_string());
            }
            DeliveryMode::Webhook { webhook_url } => {
                metadata.insert("proactiveDeliveryMode".to_string(), "webhook".to_string());
                metadata.insert("proactiveDeliveryWebhookUrl".to_string(), webhook_url.clone());
            }
        }
        if manual {
            metadata.insert("proactiveManualTrigger".to_string(), "true".to_string());
        }

        let session_key = if kind == "cron" {
            match self.config.lock().cron_rules.iter().find(|r| r.id == rule_id).map(|r| r.session_target) {
                Some(SessionTarget::Isolated) => format!("cron:{rule_id}"),
                _ => target.session_key.clone(),
            }
        } else {
            target.session_key.clone()
        };

        let req = CreateJobRequest {
            kind: JobKind::Task,
            prompt: final_prompt,
            channel: target.kind.clone(),
            chat_id: target.chat_id.clone(),
            thread_id: target.thread_id.clone(),
            requester_id: target.requester_id.clone(),
            session_key,
            requires_approval: target.requires_approval,
            metadata,
        };

        match self.store.create_job(req) {
            Ok(job) => {
                self.mark_success(key);
                info!(trigger_key = key, job_id = %job.id, "proactive job enqueued");
                EnqueueOutcome { status: EnqueueStatus::Enqueued, job_id: Some(job.id) }
            }
            Err(err) => {
                warn!(trigger_key = key, error = %err, "proactive job creation rejected");
                EnqueueOutcome { status: EnqueueStatus::DuplicateActiveJob, job_id: None }
            }
        }
    }

    /// Consults the most-recent terminal run for `key`: a failed run
    /// advances the consecutive-failure streak (capped at the schedule's
    /// longest delay); anything else resets it.
    fn backoff_blocked_until(&self, key: &str) -> Option<chrono::DateTime<Utc>> {
        let terminal = self.store.get_latest_terminal_job_by_metadata("proactiveTriggerKey", key)?;
        let mut failures = self.failures.lock();
        let tracking = failures.entry(key.to_string()).or_default();
        if tracking.last_seen_terminal != Some(terminal.id) {
            tracking.last_seen_terminal = Some(terminal.id);
            tracking.streak = if terminal.status == JobStatus::Failed { tracking.streak + 1 } else { 0 };
        }
        if tracking.streak == 0 {
            return None;
        }
        let idx = (tracking.streak as usize - 1).min(BACKOFF_SCHEDULE_SECONDS.len() - 1);
        Some(terminal.updated_at + ChronoDuration::seconds(BACKOFF_SCHEDULE_SECONDS[idx]))
    }

    fn mark_success(&self, key: &str) {
        // Streak bookkeeping only advances when we next inspect the
        // resulting terminal job in `backoff_blocked_until`; nothing to do
        // here beyond letting this run complete naturally.
        let _ = key;
    }
}

fn truncate_prompt(prompt: &str) -> (String, bool) {
    if prompt.chars().count() <= MAX_PROMPT_CHARS {
        return (prompt.to_string(), false);
    }
    let keep = 19_985;
    let mut truncated: String = prompt.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_SUFFIX);
    (truncated, true)
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
