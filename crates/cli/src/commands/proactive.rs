// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj proactive ...` — rule inspection, mutation, and the delivery outbox.

use std::io::Write;
use std::path::PathBuf;

use clap::Subcommand;
use oj_core::JobId;
use oj_proactive::{CronRule, HeartbeatRule};

use crate::client::Client;
use crate::commands::read_json_arg;
use crate::output::{format_or_json, handle_list, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ProactiveCommand {
    /// Show whether the proactive ticker is enabled and rule counts.
    State,
    /// Show the full proactive rule configuration.
    Config,
    /// List recent proactive trigger runs.
    Runs {
        #[arg(long)]
        trigger_key: Option<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    #[command(subcommand)]
    Heartbeat(HeartbeatCommand),
    #[command(subcommand)]
    Cron(CronCommand),
    #[command(subcommand)]
    Deliveries(DeliveriesCommand),
}

#[derive(Debug, Subcommand)]
pub enum HeartbeatCommand {
    /// Create or replace a heartbeat rule from a JSON document (`--file`, or stdin).
    Add {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete a heartbeat rule by id.
    Rm { id: String },
}

#[derive(Debug, Subcommand)]
pub enum CronCommand {
    /// Create or replace a cron rule from a JSON document (`--file`, or stdin).
    Add {
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Delete a cron rule by id.
    Rm { id: String },
}

#[derive(Debug, Subcommand)]
pub enum DeliveriesCommand {
    /// List deliveries awaiting acknowledgment.
    Pending,
    /// Acknowledge a delivered job, optionally recording a receipt.
    Ack {
        id: String,
        #[arg(long)]
        receipt: Option<String>,
    },
}

pub async fn run(client: &Client, command: ProactiveCommand, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        ProactiveCommand::State => {
            let state = client.proactive_state().await?;
            format_or_json(format, &state.enabled, || {
                println!(
                    "enabled: {} tick_ms: {} heartbeat_rules: {} cron_rules: {} webhooks: {}",
                    state.enabled,
                    state.tick_ms,
                    state.heartbeat_rule_count,
                    state.cron_rule_count,
                    state.webhook_count
                );
            })
        }
        ProactiveCommand::Config => {
            let config = client.proactive_config().await?;
            format_or_json(format, &config, || println!("{config:#?}"))
        }
        ProactiveCommand::Runs { trigger_key, limit } => {
            let runs = client.proactive_runs(trigger_key.as_deref(), limit).await?.runs;
            handle_list(format, &runs, "no proactive runs recorded", |runs, out| {
                for job in runs {
                    let _ = writeln!(out, "{} {} {}", job.id, job.kind, job.status);
                }
            })
        }
        ProactiveCommand::Heartbeat(HeartbeatCommand::Add { file }) => {
            let rule: HeartbeatRule = read_json_arg(file.as_deref())?;
            let config = client.upsert_heartbeat_rule(&rule).await?;
            format_or_json(format, &config, || println!("heartbeat rule {} saved", rule.id))
        }
        ProactiveCommand::Heartbeat(HeartbeatCommand::Rm { id }) => {
            let config = client.delete_heartbeat_rule(&id).await?;
            format_or_json(format, &config, || println!("heartbeat rule {id} removed"))
        }
        ProactiveCommand::Cron(CronCommand::Add { file }) => {
            let rule: CronRule = read_json_arg(file.as_deref())?;
            let config = client.upsert_cron_rule(&rule).await?;
            format_or_json(format, &config, || println!("cron rule {} saved", rule.id))
        }
        ProactiveCommand::Cron(CronCommand::Rm { id }) => {
            let config = client.delete_cron_rule(&id).await?;
            format_or_json(format, &config, || println!("cron rule {id} removed"))
        }
        ProactiveCommand::Deliveries(DeliveriesCommand::Pending) => {
            let deliveries = client.pending_deliveries().await?.deliveries;
            handle_list(format, &deliveries, "no pending deliveries", |deliveries, out| {
                for job in deliveries {
                    let _ = writeln!(out, "{} {} {}", job.id, job.kind, job.status);
                }
            })
        }
        ProactiveCommand::Deliveries(DeliveriesCommand::Ack { id, receipt }) => {
            client.ack_delivery(&JobId::from_string(id), receipt).await?;
            println!("acknowledged");
            Ok(())
        }
    }
}
