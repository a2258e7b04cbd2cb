// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A minimal stand-in agent: a shell loop that echoes an ack for every
/// request id it sees, plus a canned text delta and final transcript for
/// `prompt`/`get_last_assistant_text` so the session's full lifecycle can
/// be exercised without a real agent binary.
const FIXTURE_AGENT: &str = r#"#!/bin/sh
while IFS= read -r line; do
  id=$(printf '%s' "$line" | sed -n 's/.*"id":"\([^"]*\)".*/\1/p')
  case "$line" in
    *'"type":"prompt"'*)
      printf '{"type":"response","id":"%s","success":true}\n' "$id"
      printf '{"type":"message_update","assistantMessageEvent":{"type":"text_delta","delta":"hello "}}\n'
      printf '{"type":"agent_end"}\n'
      ;;
    *'"type":"get_last_assistant_text"'*)
      printf '{"type":"response","id":"%s","success":true,"data":{"text":"hello world"}}\n' "$id"
      ;;
    *)
      printf '{"type":"response","id":"%s","success":true}\n' "$id"
      ;;
  esac
done
"#;

async fn write_fixture_agent(dir: &Path) -> PathBuf {
    let path = dir.join("fixture-agent.sh");
    tokio::fs::write(&path, FIXTURE_AGENT).await.expect("writes fixture agent");
    let mut perms = tokio::fs::metadata(&path).await.expect("stats fixture agent").permissions();
    perms.set_mode(0o755);
    tokio::fs::set_permissions(&path, perms).await.expect("chmods fixture agent");
    path
}

fn fixture_config(session_dir: PathBuf, binary: PathBuf) -> SpawnConfig {
    SpawnConfig { binary, session_dir, provider: None, model: None, append_system_prompt: None, env: HashMap::new() }
}

#[tokio::test]
async fn run_prompt_against_fixture_agent_returns_final_text() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_fixture_agent(temp.path()).await;
    let config = fixture_config(temp.path().join("session"), script);

    let session = RpcSession::spawn(&config).await.expect("spawns session");

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let events_task = tokio::spawn(async move {
        let mut deltas = Vec::new();
        while let Some(event) = rx.recv().await {
            if let PromptEvent::TextDelta(delta) = event {
                deltas.push(delta);
            }
        }
        deltas
    });

    let outcome = session.run_prompt("hi", tx.clone()).await.expect("runs prompt");
    drop(tx);
    let deltas = events_task.await.expect("events task joins");

    assert_eq!(outcome.text, "hello world");
    assert!(outcome.had_output);
    assert!(!outcome.had_tool_activity);
    assert_eq!(deltas, vec!["hello ".to_string()]);

    session.stop().await;
}

#[tokio::test]
async fn abort_is_best_effort_and_resolves() {
    let temp = tempfile::tempdir().expect("tempdir");
    let script = write_fixture_agent(temp.path()).await;
    let config = fixture_config(temp.path().join("session"), script);

    let session = RpcSession::spawn(&config).await.expect("spawns session");
    session.abort().await.expect("abort is acked");
    session.stop().await;
}

#[tokio::test]
async fn send_request_times_out_when_no_matching_response_arrives() {
    // A fixture that never replies: the session must time out rather than
    // hang forever waiting on the pending map.
    let temp = tempfile::tempdir().expect("tempdir");
    let script_path = temp.path().join("silent-agent.sh");
    tokio::fs::write(&script_path, "#!/bin/sh\nwhile IFS= read -r line; do :; done\n").await.expect("writes fixture");
    let mut perms = tokio::fs::metadata(&script_path).await.expect("stat").permissions();
    perms.set_mode(0o755);
    tokio::fs::set_permissions(&script_path, perms).await.expect("chmod");

    let config = fixture_config(temp.path().join("session"), script_path);
    let session = RpcSession::spawn(&config).await.expect("spawns session");

    let result = session
        .send_request(wire::abort_request("req-test"), Duration::from_millis(50))
        .await;

    assert!(matches!(result, Err(RpcError::Timeout(_))));
    session.stop().await;
}
