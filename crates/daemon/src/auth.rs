// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer-token extractors for the two endpoint classes in spec §4.2/§6.3.
//! Accepts either `Authorization: Bearer <token>` or a bare `x-api-token`
//! header; either form is compared against the configured secret in
//! constant time so a wrong-length guess can't be timed apart from a
//! right-length one.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::StatusCode;
use subtle::ConstantTimeEq;

use crate::error::ApiError;
use crate::state::AppState;

fn extract_token(parts: &Parts) -> Option<&str> {
    if let Some(header) = parts.headers.get(axum::http::header::AUTHORIZATION) {
        let value = header.to_str().ok()?;
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token);
        }
    }
    parts.headers.get("x-api-token")?.to_str().ok()
}

fn token_matches(provided: Option<&str>, expected: &str) -> bool {
    let Some(provided) = provided else { return false };
    provided.len() == expected.len() && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
}

/// Proof that the request carried the gateway bearer secret.
pub struct GatewayAuth;

impl<S> FromRequestParts<S> for GatewayAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, ApiError);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        if token_matches(extract_token(parts), &app.gateway_token) {
            Ok(GatewayAuth)
        } else {
            Err((StatusCode::UNAUTHORIZED, ApiError::Unauthorized))
        }
    }
}

/// Proof that the request carried the worker bearer secret.
pub struct WorkerAuth;

impl<S> FromRequestParts<S> for WorkerAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, ApiError);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);
        if token_matches(extract_token(parts), &app.worker_token) {
            Ok(WorkerAuth)
        } else {
            Err((StatusCode::UNAUTHORIZED, ApiError::Unauthorized))
        }
    }
}
