// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawns the agent binary in RPC mode and hands back its stdio pipes.
//!
//! Readiness here is not an HTTP health check (there is no socket) - it is
//! a short grace period after spawn during which the child is given a
//! chance to fail fast (missing binary, bad args, crash-on-start). If it is
//! still alive after that window we hand the pipes to the caller and keep
//! reaping it in the background.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, ChildStdout};

use crate::error::RpcError;

const READY_CHECK_DELAY: Duration = Duration::from_millis(150);

/// Parameters for spawning one agent process backing an `RpcSession`.
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    pub binary: PathBuf,
    pub session_dir: PathBuf,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub append_system_prompt: Option<String>,
    pub env: HashMap<String, String>,
}

pub struct SpawnedProcess {
    pub child: Child,
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
}

/// Directory-name-safe rendering of a session key: anything outside
/// `[A-Za-z0-9_.-]` becomes `_`.
pub fn sanitize_session_dir_name(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

async fn prepare_session_dir(config: &SpawnConfig) -> Result<(), RpcError> {
    tokio::fs::create_dir_all(&config.session_dir).await?;
    if let Some(append) = &config.append_system_prompt {
        let path = config.session_dir.join(".system-prompt-append.md");
        tokio::fs::write(path, append).await?;
    }
    Ok(())
}

pub async fn spawn(config: &SpawnConfig) -> Result<SpawnedProcess, RpcError> {
    prepare_session_dir(config).await?;

    let mut command = tokio::process::Command::new(&config.binary);
    command
        .arg("--mode")
        .arg("rpc")
        .arg("--session-dir")
        .arg(&config.session_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(provider) = &config.provider {
        command.arg("--provider").arg(provider);
    }
    if let Some(model) = &config.model {
        command.arg("--model").arg(model);
    }
    if config.append_system_prompt.is_some() {
        command
            .arg("--append-system-prompt")
            .arg(config.session_dir.join(".system-prompt-append.md"));
    }
    for (key, value) in &config.env {
        command.env(key, value);
    }

    let mut child = command.spawn().map_err(|err| RpcError::Spawn(err.to_string()))?;

    let stdin = child.stdin.take().ok_or_else(|| RpcError::Spawn("child stdin not piped".to_string()))?;
    let stdout = child.stdout.take().ok_or_else(|| RpcError::Spawn("child stdout not piped".to_string()))?;
    let stderr = child.stderr.take();

    if let Some(stderr) = stderr {
        tokio::spawn(log_stderr(stderr));
    }

    tokio::time::sleep(READY_CHECK_DELAY).await;
    match child.try_wait() {
        Ok(Some(status)) => return Err(RpcError::ChildExited(status.to_string())),
        Ok(None) => {}
        Err(err) => return Err(RpcError::Io(err)),
    }

    Ok(SpawnedProcess { child, stdin, stdout })
}

async fn log_stderr(stderr: tokio::process::ChildStderr) {
    use tokio::io::{AsyncBufReadExt, BufReader};
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => tracing::warn!(target: "oj_rpc::child_stderr", "{line}"),
            Ok(None) => break,
            Err(err) => {
                tracing::error!(target: "oj_rpc::child_stderr", error = %err, "failed reading child stderr");
                break;
            }
        }
    }
}

pub fn session_dir_for(base: &Path, session_key: &str) -> PathBuf {
    base.join(sanitize_session_dir_name(session_key))
}

async fn write_line(stdin: &mut ChildStdin, value: &serde_json::Value) -> Result<(), RpcError> {
    let mut line = serde_json::to_string(value)?;
    line.push('\n');
    stdin.write_all(line.as_bytes()).await?;
    stdin.flush().await?;
    Ok(())
}

pub async fn write_request(stdin: &mut ChildStdin, value: &serde_json::Value) -> Result<(), RpcError> {
    write_line(stdin, value).await
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
