// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orchd` — the orchestrator binary. Loads config from the environment,
//! wires the job store, proactive runtime, and tool policy runtime, and
//! serves the control HTTP API until SIGTERM/SIGINT.

use std::sync::Arc;

use oj_core::clock::SystemClock;
use oj_daemon::{config, AppState, FileConfigSink, Metrics};
use oj_proactive::ProactiveRuntime;
use oj_storage::JobStore;
use tokio::signal::unix::{signal, SignalKind};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let gateway_token = match config::gateway_token() {
        Ok(token) => token,
        Err(err) => {
            tracing::error!(error = %err, "invalid orchestrator configuration");
            std::process::exit(1);
        }
    };
    let worker_token = match config::worker_token() {
        Ok(token) => token,
        Err(err) => {
            tracing::error!(error = %err, "invalid orchestrator configuration");
            std::process::exit(1);
        }
    };

    let clock = SystemClock;
    let store = Arc::new(JobStore::load(config::state_file(), clock.clone()));

    let proactive_config_path = config::proactive_config_file();
    let proactive_config = FileConfigSink::load_or_default(&proactive_config_path);
    let sink: Arc<dyn oj_proactive::ConfigSink> = Arc::new(FileConfigSink::new(proactive_config_path));
    let proactive = Arc::new(ProactiveRuntime::new(proactive_config, store.clone(), clock.clone(), sink));

    let tick_ms = proactive.config().tick_ms;
    let ticker = {
        let proactive = proactive.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(std::time::Duration::from_millis(tick_ms.max(1)));
            loop {
                interval.tick().await;
                proactive.tick();
            }
        })
    };

    let state = AppState {
        store,
        proactive,
        metrics: Arc::new(Metrics::default()),
        gateway_token: Arc::from(gateway_token.as_str()),
        worker_token: Arc::from(worker_token.as_str()),
    };

    let router = oj_daemon::build_router(state);
    let addr = std::net::SocketAddr::new(config::host(), config::port());
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, error = %err, "failed to bind control API listener");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "orchestrator listening");

    if let Err(err) = axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await {
        tracing::error!(error = %err, "server exited with error");
    }

    ticker.abort();
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
