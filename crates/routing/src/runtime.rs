// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The model routing runtime: route-chain planning, per-profile RPC
//! session pools, and the cooldown state fallback decisions mutate.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use oj_core::{Clock, Job};
use oj_rpc::{session_dir_for, RpcSession, RpcSessionPool, SpawnConfig};

use crate::config::ModelRoutingConfig;
use crate::error::RoutingError;
use crate::fallback::{self, FallbackInput, FallbackOutcome};

/// Where the agent binary lives and the defaults a profile inherits when
/// it doesn't override provider/model/system-prompt itself. Sourced from
/// the worker's `PI_*` environment variables.
#[derive(Debug, Clone)]
pub struct AgentEnv {
    pub binary: PathBuf,
    pub session_root: PathBuf,
    pub default_provider: Option<String>,
    pub default_model: Option<String>,
    pub default_append_system_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePlan {
    pub profiles: Vec<String>,
    pub max_attempts: u32,
}

pub struct ModelRoutingRuntime<C: Clock> {
    config: ModelRoutingConfig,
    agent: AgentEnv,
    clock: C,
    cooldowns: parking_lot::Mutex<HashMap<String, DateTime<Utc>>>,
    pools: tokio::sync::Mutex<HashMap<String, Arc<RpcSessionPool>>>,
}

impl<C: Clock> ModelRoutingRuntime<C> {
    pub fn new(config: ModelRoutingConfig, agent: AgentEnv, clock: C) -> Self {
        Self { config, agent, clock, cooldowns: parking_lot::Mutex::new(HashMap::new()), pools: tokio::sync::Mutex::new(HashMap::new()) }
    }

    pub fn config(&self) -> &ModelRoutingConfig {
        &self.config
    }

    /// Builds the ordered list of profiles to attempt for `job`, cold
    /// profiles first, truncated to `min(chain length, maxAttemptsPerJob)`.
    pub fn build_plan(&self, job: &Job) -> Result<RoutePlan, RoutingError> {
        if let Some(requested) = job.metadata.get("modelProfile") {
            if self.config.profile(requested).is_none() {
                return Err(RoutingError::UnknownProfile(requested.clone()));
            }
        }

        let mut deduped = Vec::new();
        for id in self.config.chain_for(job.kind) {
            if !deduped.contains(id) {
                deduped.push(id.clone());
            }
        }

        let now = self.clock.now_utc();
        let (cold, cooled): (Vec<String>, Vec<String>) = {
            let cooldowns = self.cooldowns.lock();
            // `Iterator::partition` preserves relative order within each
            // bucket, so when `cold` ends up empty this is exactly the
            // original route order - the "no cold profile -> unchanged"
            // case needs no special handling.
            deduped.into_iter().partition(|id| !cooldowns.get(id).is_some_and(|until| *until > now))
        };

        let mut profiles = cold;
        profiles.extend(cooled);
        let max_attempts = self.config.max_attempts_per_job();
        profiles.truncate((max_attempts as usize).min(profiles.len()));

        Ok(RoutePlan { profiles, max_attempts })
    }

    /// Lazily constructs the per-profile session pool and returns the
    /// session for `"<profileId>__<sessionKey>"` within it.
    pub async fn get_session(&self, profile_id: &str, session_key: &str) -> Result<Arc<RpcSession>, RoutingError> {
        let profile =
            self.config.profile(profile_id).ok_or_else(|| RoutingError::UnknownProfile(profile_id.to_string()))?;

        let pool = {
            let mut pools = self.pools.lock().await;
            Arc::clone(pools.entry(profile_id.to_string()).or_insert_with(|| Arc::new(RpcSessionPool::new())))
        };

        let composite_key = format!("{profile_id}__{session_key}");
        let mut env = HashMap::new();
        for var in &profile.env_from {
            if let Ok(value) = std::env::var(var) {
                env.insert(var.clone(), value);
            }
        }
        for (key, value) in &profile.env {
            env.insert(key.clone(), value.clone());
        }

        let spawn_config = SpawnConfig {
            binary: self.agent.binary.clone(),
            session_dir: session_dir_for(&self.agent.session_root, &composite_key),
            provider: profile.provider.clone().or_else(|| self.agent.default_provider.clone()),
            model: profile.model.clone().or_else(|| self.agent.default_model.clone()),
            append_system_prompt: profile
                .system_prompt_override
                .clone()
                .or_else(|| self.agent.default_append_system_prompt.clone()),
            env,
        };

        Ok(pool.get_or_create(&composite_key, &spawn_config).await?)
    }

    pub fn evaluate_fallback(&self, profile_id: &str, input: FallbackInput) -> FallbackOutcome {
        let cooldown_seconds = self.config.profile(profile_id).map(|p| p.cooldown_seconds).unwrap_or(crate::config::DEFAULT_COOLDOWN_SECONDS);
        let outcome = fallback::decide(&input, cooldown_seconds);
        if outcome.fallback {
            let now = self.clock.now_utc();
            let until = now + chrono::Duration::seconds(cooldown_seconds as i64);
            self.cooldowns.lock().insert(profile_id.to_string(), until);
        }
        outcome
    }

    pub fn mark_success(&self, profile_id: &str) {
        self.cooldowns.lock().remove(profile_id);
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
