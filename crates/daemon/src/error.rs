// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(String),

    #[error("environment variable {0} must be at least {1} characters")]
    TokenTooShort(String, usize),
}

/// Every failure mode a control-API handler can surface, mapped to the
/// status codes in spec §4.2/§7.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<oj_storage::StoreError> for ApiError {
    fn from(err: oj_storage::StoreError) -> Self {
        match err {
            oj_storage::StoreError::NotFound(id) => ApiError::NotFound(id.to_string()),
            oj_storage::StoreError::Validation(validation) => {
                ApiError::Validation { field: validation.field.clone(), message: validation.to_string() }
            }
            oj_storage::StoreError::InvalidTransition(err) => ApiError::BadRequest(err.to_string()),
            oj_storage::StoreError::Io(err) => ApiError::Internal(err.to_string()),
            oj_storage::StoreError::Serde(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<oj_proactive::ProactiveError> for ApiError {
    fn from(err: oj_proactive::ProactiveError) -> Self {
        match err {
            oj_proactive::ProactiveError::InvalidConfig(message) => {
                ApiError::Validation { field: "rule".to_string(), message }
            }
            oj_proactive::ProactiveError::Cron(cron_err) => {
                ApiError::Validation { field: "cron".to_string(), message: cron_err.to_string() }
            }
            oj_proactive::ProactiveError::NotFound(id) => ApiError::NotFound(id),
            oj_proactive::ProactiveError::Io(err) => ApiError::Internal(err.to_string()),
            oj_proactive::ProactiveError::Store(err) => ApiError::from(err),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message, field) = match self {
            ApiError::Validation { field, message } => {
                (StatusCode::BAD_REQUEST, "validation_error", Some(message), Some(field))
            }
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", None, None),
            ApiError::NotFound(id) => (StatusCode::NOT_FOUND, "not_found", Some(id), None),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, "bad_request", Some(message), None),
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "internal error handling request");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", Some(message), None)
            }
        };
        (status, Json(ErrorBody { error, message, field })).into_response()
    }
}
