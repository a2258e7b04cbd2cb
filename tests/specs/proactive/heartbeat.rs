//! Heartbeat rule CRUD via `--file` JSON documents.

use crate::prelude::*;

fn heartbeat_rule_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "everySeconds": 300,
        "prompt": "check for anything urgent",
        "delivery": { "mode": "announce" },
        "target": {
            "kind": "chat",
            "chatId": "chat-ops",
            "requesterId": "operator",
            "sessionKey": "ops-session",
            "requiresApproval": false,
        },
    })
}

#[test]
fn proactive_state_starts_with_no_rules() {
    let daemon = Daemon::start();
    daemon
        .oj()
        .args(["proactive", "state"])
        .passes()
        .stdout_has("heartbeat_rules: 0")
        .stdout_has("cron_rules: 0");
}

#[test]
fn heartbeat_add_then_rm_round_trips() {
    let daemon = Daemon::start();
    let dir = tempfile::tempdir().expect("tempdir");
    let rule_path = json_file(&dir.path().to_path_buf(), "rule.json", &heartbeat_rule_json("hb-1"));

    daemon
        .oj()
        .args(["proactive", "heartbeat", "add", "--file"])
        .args([rule_path.to_str().expect("utf8 path")])
        .passes()
        .stdout_has("hb-1 saved");

    daemon.oj().args(["proactive", "state"]).passes().stdout_has("heartbeat_rules: 1");

    daemon.oj().args(["proactive", "heartbeat", "rm", "hb-1"]).passes().stdout_has("hb-1 removed");

    daemon.oj().args(["proactive", "state"]).passes().stdout_has("heartbeat_rules: 0");
}

#[test]
fn heartbeat_add_rejects_invalid_rule() {
    let daemon = Daemon::start();
    let dir = tempfile::tempdir().expect("tempdir");
    let mut bad = heartbeat_rule_json("hb-bad");
    bad["everySeconds"] = serde_json::json!(1);
    let rule_path = json_file(&dir.path().to_path_buf(), "bad.json", &bad);

    daemon
        .oj()
        .args(["proactive", "heartbeat", "add", "--file"])
        .args([rule_path.to_str().expect("utf8 path")])
        .fails();
}
