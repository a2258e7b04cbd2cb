// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single JSON blob persisted to disk: `{jobs, events, queue, paused,
//! pauseReason, pauseUpdatedAt}`. Everything the store holds in memory is
//! this struct and nothing else.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use oj_core::{AdminState, Clock, Job, JobEvent, JobId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoreState {
    pub jobs: HashMap<JobId, Job>,
    #[serde(default)]
    pub events: HashMap<JobId, Vec<JobEvent>>,
    #[serde(default)]
    pub queue: VecDeque<JobId>,
    #[serde(default)]
    pub paused: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pause_reason: Option<String>,
    pub pause_updated_at: DateTime<Utc>,
}

impl StoreState {
    pub(crate) fn empty(clock: &impl Clock) -> Self {
        Self {
            jobs: HashMap::new(),
            events: HashMap::new(),
            queue: VecDeque::new(),
            paused: false,
            pause_reason: None,
            pause_updated_at: clock.now_utc(),
        }
    }

    pub(crate) fn admin_state(&self) -> AdminState {
        AdminState {
            paused: self.paused,
            pause_reason: self.pause_reason.clone(),
            updated_at: self.pause_updated_at,
        }
    }

    pub(crate) fn set_paused(&mut self, paused: bool, reason: Option<String>, clock: &impl Clock) {
        self.paused = paused;
        self.pause_reason = if paused { reason } else { None };
        self.pause_updated_at = clock.now_utc();
    }
}
