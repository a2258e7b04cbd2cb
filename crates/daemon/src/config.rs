// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the orchestrator binary.

use std::net::IpAddr;
use std::path::PathBuf;

use crate::error::ConfigError;

const MIN_TOKEN_CHARS: usize = 16;

pub fn port() -> u16 {
    std::env::var("ORCH_PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(8080)
}

pub fn host() -> IpAddr {
    std::env::var("ORCH_HOST")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| IpAddr::from([127, 0, 0, 1]))
}

pub fn state_file() -> PathBuf {
    std::env::var("ORCH_STATE_FILE").map(PathBuf::from).unwrap_or_else(|_| default_state_dir().join("state.json"))
}

pub fn proactive_config_file() -> PathBuf {
    std::env::var("ORCH_PROACTIVE_CONFIG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_state_dir().join("proactive.json"))
}

fn default_state_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("oj");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".local/state/oj")
}

/// Reads and validates the two bearer secrets. Both must be set and at
/// least [`MIN_TOKEN_CHARS`] long — there is no "auth disabled" mode.
pub fn gateway_token() -> Result<String, ConfigError> {
    read_token("ORCH_GATEWAY_TOKEN")
}

pub fn worker_token() -> Result<String, ConfigError> {
    read_token("ORCH_WORKER_TOKEN")
}

fn read_token(var: &str) -> Result<String, ConfigError> {
    let value = std::env::var(var).map_err(|_| ConfigError::MissingVar(var.to_string()))?;
    if value.chars().count() < MIN_TOKEN_CHARS {
        return Err(ConfigError::TokenTooShort(var.to_string(), MIN_TOKEN_CHARS));
    }
    Ok(value)
}
