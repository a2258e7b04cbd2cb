// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the worker binary (§6.4).

use std::path::PathBuf;

const DEFAULT_POLL_MS: u64 = 2_000;
const DEFAULT_HEARTBEAT_MS: u64 = 2_000;
const DEFAULT_FLUSH_MS: u64 = 1_200;

/// How the worker drives prompts: against a real agent child process, or
/// the deterministic four-step sequence used in tests/demos without a real
/// agent binary available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    Mock,
    Rpc,
}

pub fn base_url() -> String {
    std::env::var("ORCH_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

pub fn worker_token() -> Result<String, crate::error::WorkerError> {
    std::env::var("ORCH_WORKER_TOKEN")
        .map_err(|_| crate::error::WorkerError::Config("ORCH_WORKER_TOKEN is not set".to_string()))
}

/// Worker identity: an explicit override, or `<hostname>-<pid>`.
pub fn worker_id() -> String {
    if let Ok(id) = std::env::var("WORKER_ID") {
        if !id.is_empty() {
            return id;
        }
    }
    format!("{}-{}", hostname(), std::process::id())
}

fn hostname() -> String {
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| std::env::var("HOSTNAME").ok())
        .unwrap_or_else(|| "localhost".to_string())
}

pub fn poll_ms() -> u64 {
    std::env::var("WORKER_POLL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_POLL_MS)
}

pub fn heartbeat_ms() -> u64 {
    std::env::var("WORKER_HEARTBEAT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(DEFAULT_HEARTBEAT_MS)
}

pub fn flush_ms() -> u64 {
    DEFAULT_FLUSH_MS
}

pub fn exec_mode() -> ExecMode {
    match std::env::var("PI_EXEC_MODE").ok().as_deref() {
        Some("mock") => ExecMode::Mock,
        _ => ExecMode::Rpc,
    }
}

pub fn pi_binary() -> PathBuf {
    std::env::var("PI_BINARY").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("pi"))
}

pub fn pi_provider() -> Option<String> {
    std::env::var("PI_PROVIDER").ok()
}

pub fn pi_model() -> Option<String> {
    std::env::var("PI_MODEL").ok()
}

pub fn pi_workspace() -> Option<PathBuf> {
    std::env::var("PI_WORKSPACE").ok().map(PathBuf::from)
}

pub fn pi_session_root() -> PathBuf {
    std::env::var("PI_SESSION_ROOT").map(PathBuf::from).unwrap_or_else(|_| default_state_dir().join("sessions"))
}

pub fn pi_append_system_prompt() -> Option<String> {
    std::env::var("PI_APPEND_SYSTEM_PROMPT").ok()
}

pub fn pi_model_routing_file() -> Option<PathBuf> {
    std::env::var("PI_MODEL_ROUTING_FILE").ok().map(PathBuf::from)
}

pub fn pi_tool_policy_file() -> Option<PathBuf> {
    std::env::var("PI_TOOL_POLICY_FILE").ok().map(PathBuf::from)
}

fn default_state_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("oj");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".local/state/oj")
}

/// Caps attempts at the spec's hard ceiling regardless of route config.
pub const MAX_ATTEMPTS_PER_JOB_CAP: u32 = 8;
