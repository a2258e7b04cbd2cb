// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment-variable defaults for connecting to the control API,
//! overridable by the global `--base-url`/`--token` flags (§6.4).

pub fn base_url() -> String {
    std::env::var("ORCH_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

pub fn gateway_token() -> Option<String> {
    std::env::var("ORCH_GATEWAY_TOKEN").ok()
}
