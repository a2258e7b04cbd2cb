// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-job heartbeat timer (§4.4 step 2): polls the control API for
//! `abortRequested` and, the first time it observes it, posts a `log`
//! event and aborts whatever RPC session currently backs the attempt.

use std::sync::Arc;
use std::time::Duration;

use oj_core::{Clock, JobEventType, JobId};

use crate::abort::AbortSlot;
use crate::client::ControlClient;

pub fn spawn(
    client: Arc<ControlClient>,
    clock: impl Clock + 'static,
    job_id: JobId,
    abort_slot: Arc<AbortSlot>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match client.heartbeat(&job_id).await {
                Ok(true) => {
                    if abort_slot.note_abort_requested() {
                        let mut event = oj_core::JobEvent::new(JobEventType::Log, &clock);
                        event = event.with_message("Abort requested, stopping active attempt");
                        if let Err(err) = client.post_event(&job_id, &event).await {
                            tracing::warn!(%job_id, error = %err, "failed to post abort-observed log event");
                        }
                        if let Some(session) = abort_slot.current_session() {
                            let _ = session.abort().await;
                        }
                    }
                }
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(%job_id, error = %err, "heartbeat poll failed");
                }
            }
        }
    })
}
