// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route table. Auth is enforced per-handler via the [`crate::auth`]
//! extractors rather than a blanket middleware layer, so the unauthenticated
//! routes (`/healthz`, the webhook ingress) can share the same router and
//! state without an allowlist of path exceptions.

mod admin;
mod health;
mod jobs;
mod proactive;
mod tools;
mod webhooks;
mod workers;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

const MAX_BODY_BYTES: usize = 1024 * 1024;
const REQUEST_TIMEOUT_SECS: u64 = 60;

pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/v1/jobs", post(jobs::create_job))
        .route("/v1/jobs/{id}", get(jobs::get_job))
        .route("/v1/jobs/{id}/events", get(jobs::get_events))
        .route("/v1/jobs/{id}/approve", post(jobs::approve_job))
        .route("/v1/jobs/{id}/abort", post(jobs::abort_job))
        .route("/v1/admin/state", get(admin::get_state))
        .route("/v1/admin/pause", post(admin::pause))
        .route("/v1/admin/resume", post(admin::resume))
        .route("/v1/proactive/state", get(proactive::get_state))
        .route("/v1/proactive/config", get(proactive::get_config))
        .route("/v1/proactive/runs", get(proactive::get_runs))
        .route(
            "/v1/proactive/rules/heartbeat",
            post(proactive::upsert_heartbeat_rule),
        )
        .route(
            "/v1/proactive/rules/heartbeat/{id}",
            delete(proactive::delete_heartbeat_rule),
        )
        .route("/v1/proactive/rules/cron", post(proactive::upsert_cron_rule))
        .route("/v1/proactive/rules/cron/{id}", delete(proactive::delete_cron_rule))
        .route(
            "/v1/proactive/deliveries/pending",
            get(proactive::get_pending_deliveries),
        )
        .route(
            "/v1/proactive/deliveries/{id}/ack",
            post(proactive::ack_delivery),
        )
        .route("/v1/tools", get(tools::list_tools))
        .route("/v1/tools/invoke", post(tools::invoke_tool))
        .route("/v1/workers/claim", post(workers::claim))
        .route("/v1/workers/{id}/events", post(workers::post_event))
        .route("/v1/workers/{id}/heartbeat", get(workers::heartbeat))
        .route("/v1/workers/{id}/complete", post(workers::complete))
        .route("/v1/workers/{id}/fail", post(workers::fail))
        .route("/v1/workers/{id}/aborted", post(workers::aborted))
        .route("/v1/proactive/webhooks/{id}", post(webhooks::ingest))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
