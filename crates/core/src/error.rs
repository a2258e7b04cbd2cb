// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Validation and invariant errors shared by every crate that builds on
//! [`crate::job::Job`].

use thiserror::Error;

/// A field-path-qualified validation failure, the shape the control HTTP API
/// turns into a 400 response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by [`crate::job::Job`] state-machine transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobStateError {
    #[error("job {id} is in terminal status {status:?}, cannot transition")]
    AlreadyTerminal {
        id: String,
        status: crate::job::JobStatus,
    },
    #[error("job {id} cannot transition from {from:?} to {to:?}")]
    InvalidTransition {
        id: String,
        from: crate::job::JobStatus,
        to: crate::job::JobStatus,
    },
}
