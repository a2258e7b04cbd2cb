// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj` — a thin operator CLI over the control API's gateway-token
//! endpoints (§6.3): job lifecycle, admin pause/resume, proactive rule
//! management, and the tool-invocation surface.

mod client;
mod color;
mod commands;
mod config;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};

use client::Client;
use commands::{admin, jobs, proactive, tools};
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "oj", version, about = "Operator CLI for the agent control plane", styles = color::styles())]
struct Cli {
    /// Control API base URL. Defaults to $ORCH_BASE_URL or http://127.0.0.1:8080.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Gateway bearer token. Defaults to $ORCH_GATEWAY_TOKEN.
    #[arg(long, global = true)]
    token: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Job lifecycle: submit, get, events, approve, abort.
    #[command(subcommand)]
    Jobs(jobs::JobsCommand),
    /// Admin state, pause, resume.
    #[command(subcommand)]
    Admin(admin::AdminCommand),
    /// Proactive trigger rules and the delivery outbox.
    Proactive {
        #[command(subcommand)]
        command: proactive::ProactiveCommand,
    },
    /// The gateway's self-management tool surface.
    #[command(subcommand)]
    Tools(tools::ToolsCommand),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        if let Some(exit_err) = err.downcast_ref::<ExitError>() {
            eprintln!("{}", exit_err.message);
            std::process::exit(exit_err.code);
        }
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let base_url = cli.base_url.unwrap_or_else(config::base_url);
    let token = cli
        .token
        .or_else(config::gateway_token)
        .ok_or_else(|| ExitError::new(2, "missing gateway token: pass --token or set ORCH_GATEWAY_TOKEN"))?;
    let client = Client::new(base_url, token)?;

    match cli.command {
        Command::Jobs(command) => jobs::run(&client, command, cli.format).await,
        Command::Admin(command) => admin::run(&client, command, cli.format).await,
        Command::Proactive { command } => proactive::run(&client, command, cli.format).await,
        Command::Tools(command) => tools::run(&client, command, cli.format).await,
    }
}
