// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/v1/proactive/webhooks/:id` — unauthenticated except for the
//! per-rule shared secret carried in `x-webhook-secret`.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use oj_proactive::{EnqueueStatus, ProactiveError};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookResponse {
    ok: bool,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_id: Option<oj_core::JobId>,
}

pub async fn ingest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Value>,
) -> Response {
    let secret = headers.get("x-webhook-secret").and_then(|v| v.to_str().ok());
    match state.proactive.handle_webhook(&id, secret, &payload) {
        Ok(outcome) => {
            if outcome.status == EnqueueStatus::Enqueued {
                state.metrics.record_proactive_enqueued();
            }
            let status = match outcome.status {
                EnqueueStatus::Enqueued => "enqueued",
                EnqueueStatus::DuplicateActiveJob => "duplicate_active_job",
                EnqueueStatus::BackoffBlocked => "backoff_blocked",
            };
            (StatusCode::ACCEPTED, Json(WebhookResponse { ok: true, status, job_id: outcome.job_id })).into_response()
        }
        Err(ProactiveError::NotFound(message)) if message.starts_with("webhook secret mismatch") => {
            (StatusCode::UNAUTHORIZED, Json(serde_json::json!({ "error": "unauthorized" }))).into_response()
        }
        Err(ProactiveError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not_found" }))).into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "webhook ingress failed unexpectedly");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": "internal_error" }))).into_response()
        }
    }
}
