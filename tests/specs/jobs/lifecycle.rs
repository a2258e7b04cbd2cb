//! Job submission, inspection, and approval/abort transitions.
//!
//! No worker is running in these specs, so jobs submitted without approval
//! stay `queued` forever — which is exactly the state these specs assert on.

use crate::prelude::*;

#[test]
fn submit_without_approval_lands_in_queued() {
    let daemon = Daemon::start();
    daemon
        .oj()
        .args([
            "jobs",
            "submit",
            "--prompt",
            "say hello",
            "--channel",
            "cli-test",
            "--chat-id",
            "chat-1",
            "--requester-id",
            "operator",
        ])
        .passes()
        .stdout_has("task")
        .stdout_has("queued");
}

#[test]
fn submit_with_approval_required_lands_in_needs_approval() {
    let daemon = Daemon::start();
    let submitted = daemon
        .oj()
        .args([
            "jobs",
            "submit",
            "--prompt",
            "do a risky thing",
            "--channel",
            "cli-test",
            "--chat-id",
            "chat-2",
            "--requester-id",
            "operator",
            "--requires-approval",
        ])
        .passes();
    submitted.stdout_has("needs_approval");
}

#[test]
fn get_reflects_whats_submitted() {
    let daemon = Daemon::start();
    let submitted = daemon
        .oj()
        .args([
            "--format",
            "json",
            "jobs",
            "submit",
            "--prompt",
            "say hello",
            "--channel",
            "cli-test",
            "--chat-id",
            "chat-3",
            "--requester-id",
            "operator",
        ])
        .passes();
    let job: serde_json::Value = serde_json::from_str(&submitted.stdout()).expect("valid json");
    let id = job["id"].as_str().expect("job id present").to_string();

    daemon.oj().args(["jobs", "get", &id]).passes().stdout_has(&id).stdout_has("queued");
}

#[test]
fn approve_moves_a_needs_approval_job_to_queued() {
    let daemon = Daemon::start();
    let submitted = daemon
        .oj()
        .args([
            "--format",
            "json",
            "jobs",
            "submit",
            "--prompt",
            "do a risky thing",
            "--channel",
            "cli-test",
            "--chat-id",
            "chat-4",
            "--requester-id",
            "operator",
            "--requires-approval",
        ])
        .passes();
    let job: serde_json::Value = serde_json::from_str(&submitted.stdout()).expect("valid json");
    let id = job["id"].as_str().expect("job id present").to_string();

    daemon.oj().args(["jobs", "approve", &id]).passes().stdout_has("queued");
}

#[test]
fn abort_on_a_queued_job_marks_it_aborted() {
    let daemon = Daemon::start();
    let submitted = daemon
        .oj()
        .args([
            "--format",
            "json",
            "jobs",
            "submit",
            "--prompt",
            "say hello",
            "--channel",
            "cli-test",
            "--chat-id",
            "chat-5",
            "--requester-id",
            "operator",
        ])
        .passes();
    let job: serde_json::Value = serde_json::from_str(&submitted.stdout()).expect("valid json");
    let id = job["id"].as_str().expect("job id present").to_string();

    daemon.oj().args(["jobs", "abort", &id]).passes().stdout_has("aborted");
}

#[test]
fn events_lists_the_job_created_event() {
    let daemon = Daemon::start();
    let submitted = daemon
        .oj()
        .args([
            "--format",
            "json",
            "jobs",
            "submit",
            "--prompt",
            "say hello",
            "--channel",
            "cli-test",
            "--chat-id",
            "chat-6",
            "--requester-id",
            "operator",
        ])
        .passes();
    let job: serde_json::Value = serde_json::from_str(&submitted.stdout()).expect("valid json");
    let id = job["id"].as_str().expect("job id present").to_string();

    daemon.oj().args(["jobs", "events", &id]).passes().stdout_has("job_created");
}

#[test]
fn get_on_unknown_job_fails() {
    let daemon = Daemon::start();
    daemon.oj().args(["jobs", "get", "job_does_not_exist"]).fails();
}
