// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job store: single-writer, mutex-guarded, persisted as one JSON blob.
//!
//! Every mutating call takes the lock, updates in-memory state, then
//! rewrites the whole file before releasing it to the caller. Readers take a
//! deep-copy snapshot before returning so callers can't observe, or mutate,
//! the store's internals.

use std::path::PathBuf;

use oj_core::{
    AdminState, Clock, CreateJobRequest, Job, JobEvent, JobEventType, JobId, JobStatus,
    MAX_EVENTS_PER_JOB, MAX_RESULT_TEXT_CHARS,
};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::atomic::{read_json, write_json};
use crate::error::StoreError;
use crate::state::StoreState;

/// A page of a job's event log.
pub struct EventPage {
    pub events: Vec<JobEvent>,
    pub next_cursor: usize,
    pub total: usize,
}

pub struct JobStore<C: Clock> {
    path: PathBuf,
    clock: C,
    inner: Mutex<StoreState>,
}

impl<C: Clock> JobStore<C> {
    /// Load `path` if it exists; a missing or malformed file starts fresh
    /// rather than failing daemon startup.
    pub fn load(path: PathBuf, clock: C) -> Self {
        let state = match read_json::<StoreState>(&path) {
            Ok(Some(state)) => state,
            Ok(None) => StoreState::empty(&clock),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "state file unreadable, starting from empty state");
                StoreState::empty(&clock)
            }
        };
        Self { path, clock, inner: Mutex::new(state) }
    }

    fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        write_json(&self.path, state)
    }

    pub fn create_job(&self, req: CreateJobRequest) -> Result<Job, StoreError> {
        req.validate()?;
        let id = JobId::new();
        let job = Job::new(id, req, &self.clock);

        let mut state = self.inner.lock();
        let created = JobEvent::new(JobEventType::JobCreated, &self.clock);
        append_event(&mut state, id, created);
        if job.status == JobStatus::Queued {
            state.queue.push_back(id);
        }
        state.jobs.insert(id, job.clone());
        self.persist(&state)?;
        info!(job_id = %id, kind = %job.kind, "job created");
        Ok(job)
    }

    pub fn get_job(&self, id: &JobId) -> Option<Job> {
        self.inner.lock().jobs.get(id).cloned()
    }

    pub fn get_events(&self, id: &JobId, cursor: usize) -> Option<EventPage> {
        let state = self.inner.lock();
        let log = state.events.get(id)?;
        let total = log.len();
        let start = cursor.min(total);
        Some(EventPage { events: log[start..].to_vec(), next_cursor: total, total })
    }

    /// Moves a `needs_approval` job to `queued`. A no-op, not an error, on a
    /// job that has already left `needs_approval` (idempotent under retries).
    pub fn approve_job(&self, id: &JobId) -> Result<Job, StoreError> {
        let mut state = self.inner.lock();
        let job = state.jobs.get(id).cloned().ok_or_else(|| StoreError::NotFound(*id))?;
        if job.status != JobStatus::NeedsApproval {
            return Ok(job);
        }
        transition_locked(&mut state, *id, JobStatus::Queued, &self.clock)?;
        state.queue.push_back(*id);
        let approved = JobEvent::new(JobEventType::JobApproved, &self.clock);
        append_event(&mut state, *id, approved);
        self.persist(&state)?;
        let job = state.jobs.get(id).cloned().ok_or_else(|| StoreError::NotFound(*id))?;
        Ok(job)
    }

    /// Queued/`needs_approval` jobs abort immediately; running jobs are
    /// flagged via `abort_requested` and the worker finishes the abort.
    pub fn request_abort(&self, id: &JobId) -> Result<Job, StoreError> {
        let mut state = self.inner.lock();
        let job = state.jobs.get(id).cloned().ok_or_else(|| StoreError::NotFound(*id))?;
        match job.status {
            JobStatus::NeedsApproval | JobStatus::Queued => {
                state.queue.retain(|queued| queued != id);
                transition_locked(&mut state, *id, JobStatus::Aborted, &self.clock)?;
                let event = JobEvent::new(JobEventType::JobAborted, &self.clock)
                    .with_message("aborted before it started");
                append_event(&mut state, *id, event);
            }
            JobStatus::Running => {
                transition_locked(&mut state, *id, JobStatus::Aborting, &self.clock)?;
                if let Some(job) = state.jobs.get_mut(id) {
                    job.abort_requested = true;
                }
                let event = JobEvent::new(JobEventType::Log, &self.clock)
                    .with_message("abort requested");
                append_event(&mut state, *id, event);
            }
            JobStatus::Aborting | JobStatus::Aborted | JobStatus::Completed | JobStatus::Failed => {}
        }
        self.persist(&state)?;
        let job = state.jobs.get(id).cloned().ok_or_else(|| StoreError::NotFound(*id))?;
        Ok(job)
    }

    /// Pops the next queued job, assigns it to `worker_id`, and transitions
    /// it to `running`. Returns `None` while paused or when the queue is
    /// empty, including once all queued entries are skipped as stale.
    pub fn claim_next_queued_job(&self, worker_id: &str) -> Result<Option<Job>, StoreError> {
        let mut state = self.inner.lock();
        if state.paused {
            return Ok(None);
        }
        while let Some(id) = state.queue.pop_front() {
            let Some(job) = state.jobs.get(&id) else { continue };
            if job.status != JobStatus::Queued {
                continue;
            }
            transition_locked(&mut state, id, JobStatus::Running, &self.clock)?;
            if let Some(job) = state.jobs.get_mut(&id) {
                job.worker_id = Some(worker_id.to_string());
                job.started_at = Some(self.clock.now_utc());
            }
            let event = JobEvent::new(JobEventType::JobStarted, &self.clock)
                .with_message(format!("claimed by {worker_id}"));
            append_event(&mut state, id, event);
            self.persist(&state)?;
            let job = state.jobs.get(&id).cloned();
            return Ok(job);
        }
        Ok(None)
    }

    /// Appends a worker-authored event. `agent_text_delta` events also grow
    /// `Job::result_text`, capped at [`MAX_RESULT_TEXT_CHARS`].
    pub fn append_worker_event(&self, id: &JobId, event: JobEvent) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        if !state.jobs.contains_key(id) {
            return Err(StoreError::NotFound(*id));
        }
        if let Some(delta) = event.text_delta() {
            let delta = delta.to_string();
            if let Some(job) = state.jobs.get_mut(id) {
                let text = job.result_text.get_or_insert_with(String::new);
                if text.chars().count() + delta.chars().count() <= MAX_RESULT_TEXT_CHARS {
                    text.push_str(&delta);
                }
            }
        }
        append_event(&mut state, *id, event);
        self.persist(&state)
    }

    pub fn get_abort_requested(&self, id: &JobId) -> Option<bool> {
        self.inner.lock().jobs.get(id).map(|job| job.abort_requested)
    }

    pub fn complete_job(&self, id: &JobId, result_text: Option<String>) -> Result<Job, StoreError> {
        let mut state = self.inner.lock();
        let job = state.jobs.get(id).cloned().ok_or_else(|| StoreError::NotFound(*id))?;
        if job.abort_requested {
            let job = self.mark_aborted_locked(&mut state, *id, None)?;
            self.persist(&state)?;
            return Ok(job);
        }
        transition_locked(&mut state, *id, JobStatus::Completed, &self.clock)?;
        if let (Some(job), Some(text)) = (state.jobs.get_mut(id), result_text) {
            job.result_text = Some(truncate_chars(text, MAX_RESULT_TEXT_CHARS));
        }
        let event = JobEvent::new(JobEventType::JobFinished, &self.clock);
        append_event(&mut state, *id, event);
        self.persist(&state)?;
        let job = state.jobs.get(id).cloned().ok_or_else(|| StoreError::NotFound(*id))?;
        Ok(job)
    }

    pub fn fail_job(&self, id: &JobId, error: String) -> Result<Job, StoreError> {
        let mut state = self.inner.lock();
        transition_locked(&mut state, *id, JobStatus::Failed, &self.clock)?;
        let capped = truncate_chars(error, oj_core::MAX_ERROR_CHARS);
        if let Some(job) = state.jobs.get_mut(id) {
            job.error = Some(capped.clone());
        }
        let event = JobEvent::new(JobEventType::JobFailed, &self.clock).with_message(capped);
        append_event(&mut state, *id, event);
        self.persist(&state)?;
        let job = state.jobs.get(id).cloned().ok_or_else(|| StoreError::NotFound(*id))?;
        Ok(job)
    }

    pub fn mark_aborted(&self, id: &JobId, reason: Option<String>) -> Result<Job, StoreError> {
        let mut state = self.inner.lock();
        let job = self.mark_aborted_locked(&mut state, *id, reason)?;
        self.persist(&state)?;
        Ok(job)
    }

    fn mark_aborted_locked(
        &self,
        state: &mut StoreState,
        id: JobId,
        reason: Option<String>,
    ) -> Result<Job, StoreError> {
        transition_locked(state, id, JobStatus::Aborted, &self.clock)?;
        let mut event = JobEvent::new(JobEventType::JobAborted, &self.clock);
        if let Some(reason) = reason {
            event = event.with_message(reason);
        }
        append_event(state, id, event);
        state.jobs.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    pub fn has_active_job_by_metadata(&self, key: &str, value: &str) -> bool {
        self.inner
            .lock()
            .jobs
            .values()
            .any(|job| !job.status.is_terminal() && job.metadata_eq(key, value))
    }

    pub fn get_latest_terminal_job_by_metadata(&self, key: &str, value: &str) -> Option<Job> {
        self.inner
            .lock()
            .jobs
            .values()
            .filter(|job| job.status.is_terminal() && job.metadata_eq(key, value))
            .max_by_key(|job| job.updated_at)
            .cloned()
    }

    /// Jobs tagged `proactiveTriggerKey`, most recent first. Filters to a
    /// single trigger key when `trigger_key` is given.
    pub fn list_proactive_runs(&self, trigger_key: Option<&str>, limit: usize) -> Vec<Job> {
        let state = self.inner.lock();
        let mut jobs: Vec<Job> = state
            .jobs
            .values()
            .filter(|job| match (trigger_key, job.metadata.get("proactiveTriggerKey")) {
                (Some(key), Some(v)) => v == key,
                (Some(_), None) => false,
                (None, tagged) => tagged.is_some(),
            })
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit);
        jobs
    }

    /// Terminal jobs tagged with a delivery mode that haven't been delivered
    /// yet, oldest first (FIFO delivery order).
    pub fn list_pending_proactive_deliveries(&self, limit: usize) -> Vec<Job> {
        let state = self.inner.lock();
        let mut jobs: Vec<Job> = state
            .jobs
            .values()
            .filter(|job| {
                job.status.is_terminal()
                    && job.metadata.contains_key("proactiveDeliveryMode")
                    && !job.metadata.contains_key("proactiveDeliveredAt")
            })
            .cloned()
            .collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        jobs.truncate(limit);
        jobs
    }

    pub fn mark_proactive_delivery(&self, id: &JobId, receipt: Option<String>) -> Result<(), StoreError> {
        let now = self.clock.now_utc().to_rfc3339();
        let mut state = self.inner.lock();
        let job = state.jobs.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        job.metadata.insert("proactiveDeliveredAt".to_string(), now);
        if let Some(receipt) = receipt {
            job.metadata.insert("proactiveDeliveryReceipt".to_string(), receipt);
        }
        self.persist(&state)
    }

    pub fn set_paused(&self, paused: bool, reason: Option<String>) -> AdminState {
        let mut state = self.inner.lock();
        state.set_paused(paused, reason, &self.clock);
        let admin = state.admin_state();
        if let Err(err) = self.persist(&state) {
            warn!(error = %err, "failed to persist pause state");
        }
        admin
    }

    pub fn admin_state(&self) -> AdminState {
        self.inner.lock().admin_state()
    }

    pub fn job_count(&self) -> usize {
        self.inner.lock().jobs.len()
    }
}

fn append_event(state: &mut StoreState, id: JobId, event: JobEvent) {
    let log = state.events.entry(id).or_default();
    log.push(event);
    if log.len() > MAX_EVENTS_PER_JOB {
        log.remove(0);
    }
}

fn transition_locked(
    state: &mut StoreState,
    id: JobId,
    next: JobStatus,
    clock: &impl Clock,
) -> Result<(), StoreError> {
    let job = state.jobs.get_mut(&id).ok_or(StoreError::NotFound(id))?;
    job.transition(next, clock)?;
    Ok(())
}

fn truncate_chars(s: String, max: usize) -> String {
    if s.chars().count() <= max {
        s
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
