//! CLI help and usage output.

use crate::prelude::*;

#[test]
fn oj_help_shows_usage() {
    let daemon = Daemon::start();
    daemon.oj().args(["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn oj_jobs_help_shows_subcommands() {
    let daemon = Daemon::start();
    daemon
        .oj()
        .args(["jobs", "--help"])
        .passes()
        .stdout_has("submit")
        .stdout_has("approve")
        .stdout_has("abort");
}

#[test]
fn oj_admin_help_shows_subcommands() {
    let daemon = Daemon::start();
    daemon
        .oj()
        .args(["admin", "--help"])
        .passes()
        .stdout_has("pause")
        .stdout_has("resume");
}

#[test]
fn oj_version_shows_version() {
    let daemon = Daemon::start();
    daemon.oj().args(["--version"]).passes().stdout_has("oj");
}

#[test]
fn oj_without_token_fails_with_clear_message() {
    let daemon = Daemon::start();
    daemon.oj().no_token().args(["jobs", "get", "whatever"]).fails().stderr_has("missing gateway token");
}
