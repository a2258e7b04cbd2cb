// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj admin ...` — pause/resume and the control plane state snapshot.

use clap::Subcommand;

use crate::client::Client;
use crate::output::{format_or_json, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Show pause state, job count, and lightweight counters.
    State,
    /// Stop claiming/ticking without dropping in-flight jobs.
    Pause {
        #[arg(long)]
        reason: Option<String>,
    },
    /// Resume normal operation.
    Resume,
}

pub async fn run(client: &Client, command: AdminCommand, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        AdminCommand::State => {
            let state = client.admin_state().await?;
            format_or_json(format, &state.metrics, || {
                println!(
                    "paused: {} jobs: {}",
                    state.admin.paused,
                    state.job_count
                );
                if let Some(reason) = &state.admin.pause_reason {
                    println!("reason: {reason}");
                }
            })
        }
        AdminCommand::Pause { reason } => {
            let admin = client.admin_pause(reason).await?;
            format_or_json(format, &admin, || println!("paused: {}", admin.paused))
        }
        AdminCommand::Resume => {
            let admin = client.admin_resume().await?;
            format_or_json(format, &admin, || println!("paused: {}", admin.paused))
        }
    }
}
