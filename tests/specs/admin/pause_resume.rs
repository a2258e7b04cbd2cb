//! Admin pause/resume and the state snapshot.

use crate::prelude::*;

#[test]
fn admin_state_starts_unpaused() {
    let daemon = Daemon::start();
    daemon.oj().args(["admin", "state"]).passes().stdout_has("paused: false");
}

#[test]
fn admin_pause_then_resume_round_trips() {
    let daemon = Daemon::start();
    daemon
        .oj()
        .args(["admin", "pause", "--reason", "maintenance window"])
        .passes()
        .stdout_has("paused: true");

    daemon.oj().args(["admin", "state"]).passes().stdout_has("paused: true").stdout_has("maintenance window");

    daemon.oj().args(["admin", "resume"]).passes().stdout_has("paused: false");
}

#[test]
fn admin_state_json_output_round_trips() {
    let daemon = Daemon::start();
    let ran = daemon.oj().args(["--format", "json", "admin", "state"]).passes();
    let value: serde_json::Value = serde_json::from_str(&ran.stdout()).expect("valid json");
    assert!(value.is_object());
}
