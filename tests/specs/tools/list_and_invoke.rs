//! The gateway's self-management tool surface.

use crate::prelude::*;

#[test]
fn tools_list_shows_the_builtin_tools() {
    let daemon = Daemon::start();
    daemon
        .oj()
        .args(["tools", "list"])
        .passes()
        .stdout_has("heartbeat.add")
        .stdout_has("cron.list")
        .stdout_has("proactive.runs");
}

#[test]
fn tools_invoke_heartbeat_list_returns_empty_array() {
    let daemon = Daemon::start();
    let ran = daemon.oj().args(["tools", "invoke", "heartbeat.list", "--args", "{}"]).passes();
    let value: serde_json::Value = serde_json::from_str(&ran.stdout()).expect("valid json");
    assert_eq!(value["ok"], serde_json::json!(true));
    assert_eq!(value["result"], serde_json::json!([]));
}

#[test]
fn tools_invoke_unknown_tool_fails() {
    let daemon = Daemon::start();
    daemon.oj().args(["tools", "invoke", "not.a.real.tool"]).fails();
}
