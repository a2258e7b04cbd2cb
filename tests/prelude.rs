// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the `oj`/`orchd` integration specs: spins up a real
//! `orchd` process on a loopback port with a scratch state directory, and
//! wraps `oj` invocations against it.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::net::TcpStream;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use assert_cmd::cargo::cargo_bin;
use tempfile::TempDir;

const GATEWAY_TOKEN: &str = "test-gateway-token-0123456789";
const WORKER_TOKEN: &str = "test-worker-token-0123456789ab";
const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// A running `orchd` bound to an ephemeral loopback port, torn down on drop.
pub struct Daemon {
    child: Child,
    base_url: String,
    _state_dir: TempDir,
}

impl Daemon {
    pub fn start() -> Self {
        let state_dir = TempDir::new().expect("create scratch state dir");
        let port = free_port();
        let base_url = format!("http://127.0.0.1:{port}");

        let child = Command::new(cargo_bin("orchd"))
            .env("ORCH_HOST", "127.0.0.1")
            .env("ORCH_PORT", port.to_string())
            .env("ORCH_STATE_FILE", state_dir.path().join("state.json"))
            .env("ORCH_PROACTIVE_CONFIG_FILE", state_dir.path().join("proactive.json"))
            .env("ORCH_GATEWAY_TOKEN", GATEWAY_TOKEN)
            .env("ORCH_WORKER_TOKEN", WORKER_TOKEN)
            .env("RUST_LOG", "error")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn orchd");

        let daemon = Self { child, base_url, _state_dir: state_dir };
        daemon.wait_until_listening(port);
        daemon
    }

    fn wait_until_listening(&self, port: u16) {
        let deadline = Instant::now() + STARTUP_TIMEOUT;
        while Instant::now() < deadline {
            if TcpStream::connect(("127.0.0.1", port)).is_ok() {
                return;
            }
            std::thread::sleep(Duration::from_millis(25));
        }
        panic!("orchd did not start listening on 127.0.0.1:{port} within {STARTUP_TIMEOUT:?}");
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// A fresh `oj` invocation pre-wired with this daemon's base URL and the
    /// gateway token.
    pub fn oj(&self) -> Cli {
        Cli {
            cmd: assert_cmd::Command::cargo_bin("oj").expect("locate oj binary"),
            base_url: self.base_url.clone(),
            inject_token: true,
        }
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

/// A builder around an `oj` invocation, chainable the way the command's
/// own flags read: `.args(...)`, then an assertion.
pub struct Cli {
    cmd: assert_cmd::Command,
    base_url: String,
    inject_token: bool,
}

pub struct Ran {
    assert: assert_cmd::assert::Assert,
}

impl Cli {
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        self.cmd.args(args);
        self
    }

    pub fn token(mut self, token: &str) -> Self {
        self.cmd.arg("--token").arg(token);
        self
    }

    /// Skip injecting the default gateway token via env, for testing the
    /// missing-token error path.
    pub fn no_token(mut self) -> Self {
        self.inject_token = false;
        self
    }

    fn prepare(&mut self) {
        self.cmd.env("ORCH_BASE_URL", &self.base_url);
        if self.inject_token {
            self.cmd.env("ORCH_GATEWAY_TOKEN", GATEWAY_TOKEN);
        } else {
            self.cmd.env_remove("ORCH_GATEWAY_TOKEN");
        }
    }

    pub fn passes(mut self) -> Ran {
        self.prepare();
        Ran { assert: self.cmd.assert().success() }
    }

    pub fn fails(mut self) -> Ran {
        self.prepare();
        Ran { assert: self.cmd.assert().failure() }
    }
}

impl Ran {
    pub fn stdout_has(self, needle: &str) -> Self {
        let output = self.assert.get_output().stdout.clone();
        let text = String::from_utf8_lossy(&output);
        assert!(text.contains(needle), "expected stdout to contain {needle:?}, got:\n{text}");
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        let output = self.assert.get_output().stderr.clone();
        let text = String::from_utf8_lossy(&output);
        assert!(text.contains(needle), "expected stderr to contain {needle:?}, got:\n{text}");
        self
    }

    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stdout).to_string()
    }
}

/// Path to a temp-dir-local JSON file, for `--file` flag tests.
pub fn json_file(dir: &PathBuf, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec(value).expect("serialize json")).expect("write json file");
    path
}
