// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("invalid model routing config: {0}")]
    InvalidConfig(String),

    #[error("Requested model profile not found: {0}")]
    UnknownProfile(String),

    #[error(transparent)]
    Rpc(#[from] oj_rpc::RpcError),
}
