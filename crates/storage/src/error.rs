// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the job store.

use oj_core::{JobId, JobStateError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job {0} not found")]
    NotFound(JobId),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    InvalidTransition(#[from] JobStateError),

    #[error("failed to persist store state: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to (de)serialize store state: {0}")]
    Serde(#[from] serde_json::Error),
}
