// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/v1/workers/*` — worker-token protected claim loop endpoints.

use axum::extract::{Path, State};
use axum::Json;
use oj_core::{Job, JobEvent, JobId};
use serde::{Deserialize, Serialize};

use crate::auth::WorkerAuth;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimBody {
    pub worker_id: String,
}

#[derive(Serialize)]
pub struct ClaimResponse {
    pub job: Option<Job>,
}

pub async fn claim(
    _auth: WorkerAuth,
    State(state): State<AppState>,
    Json(body): Json<ClaimBody>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let job = state.store.claim_next_queued_job(&body.worker_id)?;
    if job.is_some() {
        state.metrics.record_job_claimed();
    }
    Ok(Json(ClaimResponse { job }))
}

#[derive(Debug, Deserialize)]
pub struct PostEventBody {
    pub event: JobEvent,
}

pub async fn post_event(
    _auth: WorkerAuth,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    Json(body): Json<PostEventBody>,
) -> Result<axum::http::StatusCode, ApiError> {
    state.store.append_worker_event(&id, body.event)?;
    Ok(axum::http::StatusCode::ACCEPTED)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatBody {
    pub abort_requested: bool,
}

pub async fn heartbeat(
    _auth: WorkerAuth,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<HeartbeatBody>, ApiError> {
    let abort_requested = state.store.get_abort_requested(&id).ok_or_else(|| ApiError::NotFound(id.to_string()))?;
    Ok(Json(HeartbeatBody { abort_requested }))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBody {
    #[serde(default)]
    pub result_text: Option<String>,
}

pub async fn complete(
    _auth: WorkerAuth,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    body: Option<Json<CompleteBody>>,
) -> Result<Json<Job>, ApiError> {
    let result_text = body.and_then(|Json(b)| b.result_text);
    let job = state.store.complete_job(&id, result_text)?;
    match job.status {
        oj_core::JobStatus::Aborted => state.metrics.record_job_aborted(),
        _ => state.metrics.record_job_completed(),
    }
    Ok(Json(job))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailBody {
    pub error: String,
}

pub async fn fail(
    _auth: WorkerAuth,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    Json(body): Json<FailBody>,
) -> Result<Json<Job>, ApiError> {
    let job = state.store.fail_job(&id, body.error)?;
    state.metrics.record_job_failed();
    Ok(Json(job))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AbortedBody {
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn aborted(
    _auth: WorkerAuth,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    body: Option<Json<AbortedBody>>,
) -> Result<Json<Job>, ApiError> {
    let reason = body.and_then(|Json(b)| b.reason);
    let job = state.store.mark_aborted(&id, reason)?;
    state.metrics.record_job_aborted();
    Ok(Json(job))
}
