// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::cron_expr::CronExprError;

#[derive(Debug, Error)]
pub enum ProactiveError {
    #[error("invalid proactive config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Cron(#[from] CronExprError),

    #[error("rule not found: {0}")]
    NotFound(String),

    #[error("failed to persist proactive config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to create triggered job: {0}")]
    Store(#[from] oj_storage::StoreError),
}
