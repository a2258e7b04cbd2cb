// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/v1/jobs*` — gateway-token protected job lifecycle endpoints.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use oj_core::{CreateJobRequest, Job, JobId, JobKind};
use serde::{Deserialize, Serialize};

use crate::auth::GatewayAuth;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobBody {
    #[serde(default = "default_kind")]
    pub kind: JobKind,
    pub prompt: String,
    pub channel: String,
    pub chat_id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    pub requester_id: String,
    #[serde(default)]
    pub session_key: Option<String>,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

fn default_kind() -> JobKind {
    JobKind::Task
}

#[derive(Serialize)]
pub struct JobBody {
    pub job: Job,
}

pub async fn create_job(
    _auth: GatewayAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateJobBody>,
) -> Result<(axum::http::StatusCode, Json<JobBody>), ApiError> {
    let session_key = body.session_key.unwrap_or_else(|| body.chat_id.clone());
    let req = CreateJobRequest {
        kind: body.kind,
        prompt: body.prompt,
        channel: body.channel,
        chat_id: body.chat_id,
        thread_id: body.thread_id,
        requester_id: body.requester_id,
        session_key,
        requires_approval: body.requires_approval,
        metadata: body.metadata,
    };
    let job = state.store.create_job(req)?;
    state.metrics.record_job_created();
    Ok((axum::http::StatusCode::CREATED, Json(JobBody { job })))
}

pub async fn get_job(
    _auth: GatewayAuth,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<JobBody>, ApiError> {
    let job = state.store.get_job(&id).ok_or_else(|| ApiError::NotFound(id.to_string()))?;
    Ok(Json(JobBody { job }))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub cursor: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsBody {
    pub events: Vec<oj_core::JobEvent>,
    pub next_cursor: usize,
    pub total: usize,
}

pub async fn get_events(
    _auth: GatewayAuth,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsBody>, ApiError> {
    let page = state.store.get_events(&id, query.cursor).ok_or_else(|| ApiError::NotFound(id.to_string()))?;
    Ok(Json(EventsBody { events: page.events, next_cursor: page.next_cursor, total: page.total }))
}

pub async fn approve_job(
    _auth: GatewayAuth,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<JobBody>, ApiError> {
    let job = state.store.approve_job(&id)?;
    Ok(Json(JobBody { job }))
}

pub async fn abort_job(
    _auth: GatewayAuth,
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<JobBody>, ApiError> {
    let job = state.store.request_abort(&id)?;
    if job.status == oj_core::JobStatus::Aborted {
        state.metrics.record_job_aborted();
    }
    Ok(Json(JobBody { job }))
}
