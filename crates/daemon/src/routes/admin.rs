// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/v1/admin/*` — pause/resume and the lightweight metrics snapshot.

use axum::extract::State;
use axum::Json;
use oj_core::AdminState;
use serde::{Deserialize, Serialize};

use crate::auth::GatewayAuth;
use crate::metrics::MetricsSnapshot;
use crate::state::AppState;

#[derive(Serialize)]
pub struct AdminStateBody {
    #[serde(flatten)]
    pub admin: AdminState,
    pub metrics: MetricsSnapshot,
    pub job_count: usize,
}

pub async fn get_state(_auth: GatewayAuth, State(state): State<AppState>) -> Json<AdminStateBody> {
    Json(AdminStateBody {
        admin: state.store.admin_state(),
        metrics: state.metrics.snapshot(),
        job_count: state.store.job_count(),
    })
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PauseBody {
    #[serde(default)]
    pub reason: Option<String>,
}

pub async fn pause(
    _auth: GatewayAuth,
    State(state): State<AppState>,
    body: Option<Json<PauseBody>>,
) -> Json<AdminState> {
    let reason = body.and_then(|Json(b)| b.reason);
    Json(state.store.set_paused(true, reason))
}

pub async fn resume(_auth: GatewayAuth, State(state): State<AppState>) -> Json<AdminState> {
    Json(state.store.set_paused(false, None))
}
