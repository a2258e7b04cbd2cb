// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("failed to spawn agent process: {0}")]
    Spawn(String),

    #[error("agent process exited before becoming ready")]
    ExitedBeforeReady,

    #[error("io error talking to agent process: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed line from agent process: {0}")]
    Protocol(String),

    #[error("failed to encode request: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("agent process exited while a request was pending: {0}")]
    ChildExited(String),
}
