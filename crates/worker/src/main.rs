// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `workerd` — the worker binary. Loads config from the environment,
//! wires the model routing runtime, tool policy runtime, and control API
//! client, and runs the claim loop until SIGTERM/SIGINT.

use std::sync::Arc;

use oj_core::clock::SystemClock;
use oj_policy::ToolPolicyRuntime;
use oj_routing::{AgentEnv, ModelRoutingConfig, ModelRoutingRuntime};
use oj_worker::{claim_loop::Worker, config, ControlClient};
use tokio::signal::unix::{signal, SignalKind};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let worker_token = match config::worker_token() {
        Ok(token) => token,
        Err(err) => {
            tracing::error!(error = %err, "invalid worker configuration");
            std::process::exit(1);
        }
    };
    let worker_id = config::worker_id();
    let client = match ControlClient::new(config::base_url(), worker_token) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            tracing::error!(error = %err, "failed to build control API client");
            std::process::exit(1);
        }
    };

    let routing_config = match load_routing_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid model routing configuration");
            std::process::exit(1);
        }
    };
    let agent_env = AgentEnv {
        binary: config::pi_binary(),
        session_root: config::pi_session_root(),
        default_provider: config::pi_provider(),
        default_model: config::pi_model(),
        default_append_system_prompt: config::pi_append_system_prompt(),
    };
    let clock = SystemClock;
    let routing = Arc::new(ModelRoutingRuntime::new(routing_config, agent_env, clock.clone()));

    let policy_config = match load_policy_config() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid tool policy configuration");
            std::process::exit(1);
        }
    };
    let policy = Some(Arc::new(ToolPolicyRuntime::new(policy_config)));

    tracing::info!(worker_id, exec_mode = ?config::exec_mode(), "worker starting");

    let worker = Worker {
        client,
        routing,
        policy,
        clock,
        worker_id,
        poll_interval: std::time::Duration::from_millis(config::poll_ms()),
        heartbeat_interval: std::time::Duration::from_millis(config::heartbeat_ms()),
        flush_interval: std::time::Duration::from_millis(config::flush_ms()),
        exec_mode: config::exec_mode(),
    };

    worker.run(shutdown_signal()).await;
}

fn load_routing_config() -> Result<ModelRoutingConfig, String> {
    let config = match config::pi_model_routing_file() {
        Some(path) => {
            let data = std::fs::read_to_string(&path)
                .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
            serde_json::from_str(&data).map_err(|err| format!("failed to parse {}: {err}", path.display()))?
        }
        None => ModelRoutingConfig::legacy_single_profile(config::pi_provider(), config::pi_model()),
    };
    config.validate_and_normalize().map_err(|err| err.to_string())
}

fn load_policy_config() -> Result<oj_policy::ToolPolicyConfig, String> {
    let config = match config::pi_tool_policy_file() {
        Some(path) => {
            let data = std::fs::read_to_string(&path)
                .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
            serde_json::from_str(&data).map_err(|err| format!("failed to parse {}: {err}", path.display()))?
        }
        None => oj_policy::ToolPolicyConfig::default(),
    };
    config.validate().map_err(|err| err.to_string())?;
    Ok(config)
}

async fn shutdown_signal() {
    let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
        tracing::error!("failed to install SIGTERM handler");
        std::process::exit(1);
    };
    let Ok(mut sigint) = signal(SignalKind::interrupt()) else {
        tracing::error!("failed to install SIGINT handler");
        std::process::exit(1);
    };
    tokio::select! {
        _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => tracing::info!("received SIGINT, shutting down"),
    }
}
