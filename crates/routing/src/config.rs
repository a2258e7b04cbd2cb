// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Model profiles and route chains: the static config a
//! [`crate::runtime::ModelRoutingRuntime`] is built from.

use std::collections::{HashMap, HashSet};

use oj_core::JobKind;
use serde::{Deserialize, Serialize};

use crate::error::RoutingError;

pub const DEFAULT_COOLDOWN_SECONDS: u64 = 180;
pub const MAX_ATTEMPTS_PER_JOB_CAP: u32 = 8;

fn default_cooldown_seconds() -> u64 {
    DEFAULT_COOLDOWN_SECONDS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelProfile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,
    /// Values set directly on the spawned agent's environment.
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Host environment variable names that must already be set; their
    /// values are forwarded to the spawned agent unchanged.
    #[serde(default)]
    pub env_from: Vec<String>,
}

impl Default for ModelProfile {
    fn default() -> Self {
        Self {
            id: String::new(),
            provider: None,
            model: None,
            system_prompt_override: None,
            cooldown_seconds: DEFAULT_COOLDOWN_SECONDS,
            env: HashMap::new(),
            env_from: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteChains {
    #[serde(default)]
    pub default: Vec<String>,
    #[serde(default)]
    pub task: Vec<String>,
    #[serde(default)]
    pub run: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRoutingConfig {
    pub profiles: Vec<ModelProfile>,
    #[serde(default)]
    pub route_chains: RouteChains,
    #[serde(default)]
    pub max_attempts_per_job: Option<u32>,
}

impl ModelRoutingConfig {
    /// The config used when no routing file is configured: one profile
    /// built from the worker's default provider/model env vars.
    pub fn legacy_single_profile(provider: Option<String>, model: Option<String>) -> Self {
        let profile = ModelProfile { id: "default".to_string(), provider, model, ..ModelProfile::default() };
        Self { profiles: vec![profile], route_chains: RouteChains::default(), max_attempts_per_job: None }
    }

    /// Validates profile identity/cooldown/env-from constraints and fills
    /// in empty route chains. Consumes and returns `self` so a caller
    /// can't accidentally use the pre-normalization config.
    pub fn validate_and_normalize(mut self) -> Result<Self, RoutingError> {
        if self.profiles.is_empty() {
            return Err(RoutingError::InvalidConfig("at least one model profile is required".to_string()));
        }
        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if profile.id.is_empty() {
                return Err(RoutingError::InvalidConfig("profile id must not be empty".to_string()));
            }
            if !seen.insert(profile.id.as_str()) {
                return Err(RoutingError::InvalidConfig(format!("duplicate profile id: {}", profile.id)));
            }
            if profile.cooldown_seconds == 0 {
                return Err(RoutingError::InvalidConfig(format!(
                    "profile {} cooldownSeconds must be > 0",
                    profile.id
                )));
            }
            for var in &profile.env_from {
                if std::env::var(var).is_err() {
                    return Err(RoutingError::InvalidConfig(format!(
                        "profile {} envFrom host variable {var} is not set",
                        profile.id
                    )));
                }
            }
        }

        let first = self.profiles[0].id.clone();
        if self.route_chains.default.is_empty() {
            self.route_chains.default = vec![first];
        }
        if self.route_chains.task.is_empty() {
            self.route_chains.task = self.route_chains.default.clone();
        }
        if self.route_chains.run.is_empty() {
            self.route_chains.run = self.route_chains.default.clone();
        }

        self.max_attempts_per_job =
            Some(self.max_attempts_per_job.unwrap_or(MAX_ATTEMPTS_PER_JOB_CAP).min(MAX_ATTEMPTS_PER_JOB_CAP));
        Ok(self)
    }

    pub fn profile(&self, id: &str) -> Option<&ModelProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn chain_for(&self, kind: JobKind) -> &[String] {
        match kind {
            JobKind::Task => &self.route_chains.task,
            JobKind::Run => &self.route_chains.run,
        }
    }

    pub fn max_attempts_per_job(&self) -> u32 {
        self.max_attempts_per_job.unwrap_or(MAX_ATTEMPTS_PER_JOB_CAP)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
