// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared application state handed to every axum handler.

use std::sync::Arc;

use axum::extract::FromRef;
use oj_core::clock::SystemClock;
use oj_proactive::ProactiveRuntime;
use oj_storage::JobStore;

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<JobStore<SystemClock>>,
    pub proactive: Arc<ProactiveRuntime<SystemClock>>,
    pub metrics: Arc<Metrics>,
    pub gateway_token: Arc<str>,
    pub worker_token: Arc<str>,
}

impl FromRef<AppState> for Arc<JobStore<SystemClock>> {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Arc<ProactiveRuntime<SystemClock>> {
    fn from_ref(state: &AppState) -> Self {
        state.proactive.clone()
    }
}

impl FromRef<AppState> for Arc<Metrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}
