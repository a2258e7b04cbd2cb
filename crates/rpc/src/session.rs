// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single agent child process and the request/response multiplexer over
//! its stdio pipes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::{broadcast, oneshot, Mutex as AsyncMutex};

use crate::error::RpcError;
use crate::process::{self, SpawnConfig, SpawnedProcess};
use crate::wire::{self, Incoming};

const PROMPT_ACK_TIMEOUT: Duration = Duration::from_secs(60);
const PROMPT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(15 * 60);
const ABORT_TIMEOUT: Duration = Duration::from_secs(10);
const GET_LAST_ASSISTANT_TEXT_TIMEOUT: Duration = Duration::from_secs(30);
const BROADCAST_CAPACITY: usize = 256;

/// Events surfaced while a prompt is in flight, forwarded to the caller as
/// they arrive so job records can be updated incrementally.
#[derive(Debug, Clone)]
pub enum PromptEvent {
    TextDelta(String),
    ToolStart(String),
    ToolEnd(String),
    AgentEnd,
}

/// Summary of one `run_prompt` call, enough for a route chain to decide
/// whether a failed attempt is eligible for fallback.
#[derive(Debug, Clone, Default)]
pub struct PromptOutcome {
    pub text: String,
    pub had_output: bool,
    pub had_tool_activity: bool,
}

struct Inner {
    stdin: AsyncMutex<ChildStdin>,
    pending: parking_lot::Mutex<HashMap<String, oneshot::Sender<Value>>>,
    events: broadcast::Sender<PromptEvent>,
    next_id: AtomicU64,
}

impl Inner {
    fn next_request_id(&self) -> String {
        format!("req-{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn fail_all_pending(&self) {
        let mut pending = self.pending.lock();
        pending.clear();
    }
}

/// One long-lived agent process plus the plumbing to drive prompts through
/// it. Session key namespacing (which profile, which conversation) is the
/// caller's concern; this type just owns one child and its pipes.
pub struct RpcSession {
    inner: Arc<Inner>,
    child: AsyncMutex<Child>,
}

impl RpcSession {
    pub async fn spawn(config: &SpawnConfig) -> Result<Self, RpcError> {
        let SpawnedProcess { child, stdin, stdout } = process::spawn(config).await?;

        let (events_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        let inner = Arc::new(Inner {
            stdin: AsyncMutex::new(stdin),
            pending: parking_lot::Mutex::new(HashMap::new()),
            events: events_tx,
            next_id: AtomicU64::new(0),
        });

        tokio::spawn(read_loop(Arc::clone(&inner), stdout));

        Ok(Self { inner, child: AsyncMutex::new(child) })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PromptEvent> {
        self.inner.events.subscribe()
    }

    async fn send_request(&self, value: Value, timeout: Duration) -> Result<Value, RpcError> {
        let id = value.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
        let (tx, rx) = oneshot::channel();
        self.inner.pending.lock().insert(id.clone(), tx);

        {
            let mut stdin = self.inner.stdin.lock().await;
            if let Err(err) = process::write_request(&mut stdin, &value).await {
                self.inner.pending.lock().remove(&id);
                return Err(err);
            }
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => Err(RpcError::ChildExited("agent stdout closed".to_string())),
            Err(_) => {
                self.inner.pending.lock().remove(&id);
                Err(RpcError::Timeout(timeout))
            }
        }
    }

    /// Runs the full prompt lifecycle: subscribe, send the prompt and wait
    /// for its ack, collect events until `agent_end`, then fetch the final
    /// assistant text.
    pub async fn run_prompt(
        &self,
        message: &str,
        on_event: tokio::sync::mpsc::Sender<PromptEvent>,
    ) -> Result<PromptOutcome, RpcError> {
        let mut events = self.subscribe();

        let id = self.inner.next_request_id();
        self.send_request(wire::prompt_request(&id, message), PROMPT_ACK_TIMEOUT).await?;

        let mut outcome = PromptOutcome::default();
        let deadline = tokio::time::Instant::now() + PROMPT_COMPLETION_TIMEOUT;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Err(RpcError::Timeout(PROMPT_COMPLETION_TIMEOUT));
            }
            match tokio::time::timeout(remaining, events.recv()).await {
                Ok(Ok(PromptEvent::TextDelta(delta))) => {
                    outcome.had_output = true;
                    let _ = on_event.send(PromptEvent::TextDelta(delta)).await;
                }
                Ok(Ok(PromptEvent::ToolStart(name))) => {
                    outcome.had_tool_activity = true;
                    let _ = on_event.send(PromptEvent::ToolStart(name)).await;
                }
                Ok(Ok(PromptEvent::ToolEnd(name))) => {
                    let _ = on_event.send(PromptEvent::ToolEnd(name)).await;
                }
                Ok(Ok(PromptEvent::AgentEnd)) => break,
                Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
                Ok(Err(broadcast::error::RecvError::Closed)) => {
                    return Err(RpcError::ChildExited("event channel closed".to_string()));
                }
                Err(_) => return Err(RpcError::Timeout(PROMPT_COMPLETION_TIMEOUT)),
            }
        }

        let id = self.inner.next_request_id();
        let response = self
            .send_request(wire::get_last_assistant_text_request(&id), GET_LAST_ASSISTANT_TEXT_TIMEOUT)
            .await?;
        outcome.text = response.get("data").and_then(|data| data.get("text")).and_then(Value::as_str).unwrap_or_default().to_string();
        Ok(outcome)
    }

    /// Best-effort abort: failures are swallowed by the caller, never
    /// surfaced as a job-ending error.
    pub async fn abort(&self) -> Result<(), RpcError> {
        let id = self.inner.next_request_id();
        self.send_request(wire::abort_request(&id), ABORT_TIMEOUT).await.map(|_| ())
    }

    pub async fn stop(&self) {
        let pid = {
            let child = self.child.lock().await;
            child.id()
        };
        let Some(pid) = pid else { return };

        if let Err(err) = nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), nix::sys::signal::Signal::SIGTERM) {
            tracing::warn!(%pid, error = %err, "failed to send SIGTERM to agent process");
        }

        let mut child = self.child.lock().await;
        match tokio::time::timeout(Duration::from_secs(2), child.wait()).await {
            Ok(_) => {}
            Err(_) => {
                if let Err(err) =
                    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), nix::sys::signal::Signal::SIGKILL)
                {
                    tracing::warn!(%pid, error = %err, "failed to send SIGKILL to agent process");
                }
                let _ = child.wait().await;
            }
        }
        self.inner.fail_all_pending();
    }
}

async fn read_loop(inner: Arc<Inner>, stdout: tokio::process::ChildStdout) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => handle_line(&inner, &line).await,
            Ok(None) => {
                inner.fail_all_pending();
                break;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed reading agent stdout");
                inner.fail_all_pending();
                break;
            }
        }
    }
}

async fn handle_line(inner: &Arc<Inner>, line: &str) {
    let parsed = match wire::parse_line(line) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(error = %err, line, "dropping malformed line from agent process");
            return;
        }
    };
    match parsed {
        Incoming::Response { id, value } => {
            if let Some(tx) = inner.pending.lock().remove(&id) {
                let _ = tx.send(value);
            }
        }
        Incoming::ExtensionUiRequest { id } => {
            let mut stdin = inner.stdin.lock().await;
            if let Err(err) = process::write_request(&mut stdin, &wire::extension_ui_response(&id)).await {
                tracing::warn!(error = %err, "failed to answer extension_ui_request");
            }
        }
        Incoming::TextDelta(delta) => {
            let _ = inner.events.send(PromptEvent::TextDelta(delta));
        }
        Incoming::ToolStart(name) => {
            let _ = inner.events.send(PromptEvent::ToolStart(name));
        }
        Incoming::ToolEnd(name) => {
            let _ = inner.events.send(PromptEvent::ToolEnd(name));
        }
        Incoming::AgentEnd => {
            let _ = inner.events.send(PromptEvent::AgentEnd);
        }
        Incoming::Other(_) => {}
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
