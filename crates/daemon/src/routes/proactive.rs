// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/v1/proactive/*` — rule inspection, mutation, and the delivery outbox.

use axum::extract::{Path, Query, State};
use axum::Json;
use oj_proactive::{CronRule, HeartbeatRule, ProactiveConfig};
use serde::{Deserialize, Serialize};

use crate::auth::GatewayAuth;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProactiveStateBody {
    pub enabled: bool,
    pub tick_ms: u64,
    pub heartbeat_rule_count: usize,
    pub cron_rule_count: usize,
    pub webhook_count: usize,
}

pub async fn get_state(_auth: GatewayAuth, State(state): State<AppState>) -> Json<ProactiveStateBody> {
    let config = state.proactive.config();
    Json(ProactiveStateBody {
        enabled: config.enabled,
        tick_ms: config.tick_ms,
        heartbeat_rule_count: config.heartbeat_rules.len(),
        cron_rule_count: config.cron_rules.len(),
        webhook_count: config.webhooks.len(),
    })
}

pub async fn get_config(_auth: GatewayAuth, State(state): State<AppState>) -> Json<ProactiveConfig> {
    Json(state.proactive.config())
}

#[derive(Debug, Deserialize)]
pub struct RunsQuery {
    #[serde(default)]
    pub trigger_key: Option<String>,
    #[serde(default = "default_runs_limit")]
    pub limit: usize,
}

fn default_runs_limit() -> usize {
    50
}

#[derive(Serialize)]
pub struct RunsBody {
    pub runs: Vec<oj_core::Job>,
}

pub async fn get_runs(
    _auth: GatewayAuth,
    State(state): State<AppState>,
    Query(query): Query<RunsQuery>,
) -> Json<RunsBody> {
    let runs = state.store.list_proactive_runs(query.trigger_key.as_deref(), query.limit);
    Json(RunsBody { runs })
}

pub async fn upsert_heartbeat_rule(
    _auth: GatewayAuth,
    State(state): State<AppState>,
    Json(rule): Json<HeartbeatRule>,
) -> Result<Json<ProactiveConfig>, ApiError> {
    state.proactive.upsert_heartbeat(rule)?;
    Ok(Json(state.proactive.config()))
}

pub async fn delete_heartbeat_rule(
    _auth: GatewayAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProactiveConfig>, ApiError> {
    state.proactive.delete_heartbeat(&id)?;
    Ok(Json(state.proactive.config()))
}

pub async fn upsert_cron_rule(
    _auth: GatewayAuth,
    State(state): State<AppState>,
    Json(rule): Json<CronRule>,
) -> Result<Json<ProactiveConfig>, ApiError> {
    state.proactive.upsert_cron(rule)?;
    Ok(Json(state.proactive.config()))
}

pub async fn delete_cron_rule(
    _auth: GatewayAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProactiveConfig>, ApiError> {
    state.proactive.delete_cron(&id)?;
    Ok(Json(state.proactive.config()))
}

#[derive(Serialize)]
pub struct PendingDeliveriesBody {
    pub deliveries: Vec<oj_core::Job>,
}

pub async fn get_pending_deliveries(_auth: GatewayAuth, State(state): State<AppState>) -> Json<PendingDeliveriesBody> {
    let deliveries = state.store.list_pending_proactive_deliveries(100);
    Json(PendingDeliveriesBody { deliveries })
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AckDeliveryBody {
    #[serde(default)]
    pub receipt: Option<String>,
}

pub async fn ack_delivery(
    _auth: GatewayAuth,
    State(state): State<AppState>,
    Path(id): Path<oj_core::JobId>,
    body: Option<Json<AckDeliveryBody>>,
) -> Result<axum::http::StatusCode, ApiError> {
    let receipt = body.and_then(|Json(b)| b.receipt);
    state.store.mark_proactive_delivery(&id, receipt)?;
    Ok(axum::http::StatusCode::OK)
}
