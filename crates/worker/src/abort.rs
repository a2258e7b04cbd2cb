// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared state between the claim loop and its heartbeat timer: which RPC
//! session (if any) currently backs the active attempt, and whether an
//! abort has already been acted on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use oj_rpc::RpcSession;
use parking_lot::Mutex;

#[derive(Default)]
pub struct AbortSlot {
    session: Mutex<Option<Arc<RpcSession>>>,
    abort_requested: AtomicBool,
    acted: AtomicBool,
}

impl AbortSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset_for_job(&self) {
        self.abort_requested.store(false, Ordering::SeqCst);
        self.acted.store(false, Ordering::SeqCst);
        *self.session.lock() = None;
    }

    pub fn set_session(&self, session: Arc<RpcSession>) {
        *self.session.lock() = Some(session);
    }

    pub fn clear_session(&self) {
        *self.session.lock() = None;
    }

    pub fn current_session(&self) -> Option<Arc<RpcSession>> {
        self.session.lock().clone()
    }

    pub fn is_abort_requested(&self) -> bool {
        self.abort_requested.load(Ordering::SeqCst)
    }

    /// Marks abort requested; returns `true` the first time this is
    /// observed for the current job, so the caller acts (logs + aborts the
    /// live session) exactly once.
    pub fn note_abort_requested(&self) -> bool {
        self.abort_requested.store(true, Ordering::SeqCst);
        self.acted.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_ok()
    }
}
