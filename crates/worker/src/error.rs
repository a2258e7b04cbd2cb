// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the worker's control-API client and claim loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("control API request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("control API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Rpc(#[from] oj_rpc::RpcError),
    #[error(transparent)]
    Routing(#[from] oj_routing::RoutingError),
}
