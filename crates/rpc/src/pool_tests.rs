// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;

async fn echo_agent(dir: &std::path::Path) -> SpawnConfig {
    let script_path = dir.join("echo-agent.sh");
    let script = "#!/bin/sh\nwhile IFS= read -r line; do :; done\n";
    tokio::fs::write(&script_path, script).await.expect("writes fixture");
    let mut perms = tokio::fs::metadata(&script_path).await.expect("stat").permissions();
    perms.set_mode(0o755);
    tokio::fs::set_permissions(&script_path, perms).await.expect("chmod");
    SpawnConfig {
        binary: script_path,
        session_dir: dir.join("session"),
        provider: None,
        model: None,
        append_system_prompt: None,
        env: HashMap::new(),
    }
}

#[tokio::test]
async fn reuses_session_for_same_key() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = echo_agent(temp.path()).await;
    let pool = RpcSessionPool::new();

    let first = pool.get_or_create("primary__chat-1", &config).await.expect("spawns");
    let second = pool.get_or_create("primary__chat-1", &config).await.expect("reuses");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(pool.len().await, 1);

    pool.shutdown().await;
}

#[tokio::test]
async fn distinct_keys_get_distinct_sessions() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config_a = echo_agent(&temp.path().join("a")).await;
    let config_b = echo_agent(&temp.path().join("b")).await;
    let pool = RpcSessionPool::new();

    let a = pool.get_or_create("primary__chat-a", &config_a).await.expect("spawns a");
    let b = pool.get_or_create("primary__chat-b", &config_b).await.expect("spawns b");

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(pool.len().await, 2);

    pool.shutdown().await;
}

#[tokio::test]
async fn evict_removes_session_so_next_call_respawns() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = echo_agent(temp.path()).await;
    let pool = RpcSessionPool::new();

    let first = pool.get_or_create("primary__chat-1", &config).await.expect("spawns");
    pool.evict("primary__chat-1").await;
    assert_eq!(pool.len().await, 0);

    let second = pool.get_or_create("primary__chat-1", &config).await.expect("respawns");
    assert!(!Arc::ptr_eq(&first, &second));

    pool.shutdown().await;
}
