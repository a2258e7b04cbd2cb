// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide admin pause state.

use crate::clock::Clock;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One process-wide instance; toggled by `POST /v1/admin/pause|/resume`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminState {
    pub paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_reason: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl AdminState {
    pub fn new(clock: &impl Clock) -> Self {
        Self {
            paused: false,
            pause_reason: None,
            updated_at: clock.now_utc(),
        }
    }

    pub fn set_paused(&mut self, paused: bool, reason: Option<String>, clock: &impl Clock) {
        self.paused = paused;
        self.pause_reason = if paused { reason } else { None };
        self.updated_at = clock.now_utc();
    }
}
