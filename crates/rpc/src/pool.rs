// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keeps one `RpcSession` alive per opaque session key, spawning lazily on
//! first use. Key composition (e.g. `"<profileId>__<sessionKey>"`) is the
//! caller's concern; this pool only ever sees the final string.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::RpcError;
use crate::process::SpawnConfig;
use crate::session::RpcSession;

#[derive(Default)]
pub struct RpcSessionPool {
    sessions: Mutex<HashMap<String, Arc<RpcSession>>>,
}

impl RpcSessionPool {
    pub fn new() -> Self {
        Self { sessions: Mutex::new(HashMap::new()) }
    }

    /// Returns the existing session for `key`, spawning a fresh one with
    /// `spawn_config` if none exists yet.
    pub async fn get_or_create(&self, key: &str, spawn_config: &SpawnConfig) -> Result<Arc<RpcSession>, RpcError> {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(key) {
            return Ok(Arc::clone(session));
        }
        let session = Arc::new(RpcSession::spawn(spawn_config).await?);
        sessions.insert(key.to_string(), Arc::clone(&session));
        Ok(session)
    }

    pub async fn get(&self, key: &str) -> Option<Arc<RpcSession>> {
        self.sessions.lock().await.get(key).cloned()
    }

    /// Stops and drops the session for `key`, if one is live. A future
    /// `get_or_create` for the same key spawns a fresh process.
    pub async fn evict(&self, key: &str) {
        let session = self.sessions.lock().await.remove(key);
        if let Some(session) = session {
            session.stop().await;
        }
    }

    pub async fn shutdown(&self) {
        let sessions = {
            let mut sessions = self.sessions.lock().await;
            std::mem::take(&mut *sessions)
        };
        for (_, session) in sessions {
            session.stop().await;
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
