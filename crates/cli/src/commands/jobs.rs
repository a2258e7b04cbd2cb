// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj jobs ...` — the job lifecycle surface of the control API (§6.3).

use std::collections::HashMap;

use clap::{Args, Subcommand, ValueEnum};
use oj_core::JobId;

use crate::client::{Client, CreateJobBody};
use crate::output::{format_or_json, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JobKindArg {
    Task,
    Run,
}

impl From<JobKindArg> for oj_core::JobKind {
    fn from(value: JobKindArg) -> Self {
        match value {
            JobKindArg::Task => oj_core::JobKind::Task,
            JobKindArg::Run => oj_core::JobKind::Run,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    /// Submit a new job.
    Submit(SubmitArgs),
    /// Fetch a job by id.
    Get { id: String },
    /// Fetch a job's event log.
    Events {
        id: String,
        #[arg(long, default_value_t = 0)]
        cursor: usize,
    },
    /// Approve a job stuck in `needs_approval`.
    Approve { id: String },
    /// Request cooperative abort of a running job.
    Abort { id: String },
}

#[derive(Debug, Args)]
pub struct SubmitArgs {
    #[arg(long, value_enum, default_value_t = JobKindArg::Task)]
    pub kind: JobKindArg,
    #[arg(long)]
    pub prompt: String,
    #[arg(long)]
    pub channel: String,
    #[arg(long)]
    pub chat_id: String,
    #[arg(long)]
    pub thread_id: Option<String>,
    #[arg(long)]
    pub requester_id: String,
    #[arg(long)]
    pub session_key: Option<String>,
    #[arg(long)]
    pub requires_approval: bool,
    /// Repeatable `key=value` metadata pairs.
    #[arg(long = "meta", value_parser = parse_meta)]
    pub metadata: Vec<(String, String)>,
}

fn parse_meta(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw.split_once('=').ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    Ok((key.to_string(), value.to_string()))
}

pub async fn run(client: &Client, command: JobsCommand, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        JobsCommand::Submit(args) => {
            let metadata: HashMap<String, String> = args.metadata.into_iter().collect();
            let job = client
                .create_job(CreateJobBody {
                    kind: args.kind.into(),
                    prompt: args.prompt,
                    channel: args.channel,
                    chat_id: args.chat_id,
                    thread_id: args.thread_id,
                    requester_id: args.requester_id,
                    session_key: args.session_key,
                    requires_approval: args.requires_approval,
                    metadata,
                })
                .await?;
            print_job(&job, format)
        }
        JobsCommand::Get { id } => {
            let job = client.get_job(&JobId::from_string(id)).await?;
            print_job(&job, format)
        }
        JobsCommand::Events { id, cursor } => {
            let page = client.get_events(&JobId::from_string(id), cursor).await?;
            format_or_json(format, &page.events, || {
                for event in &page.events {
                    println!(
                        "[{}] {:?} {}",
                        crate::color::muted(&event.ts.to_rfc3339()),
                        event.event_type,
                        event.message.as_deref().unwrap_or("")
                    );
                }
                println!("\n{} event(s), next cursor {}", page.total, page.next_cursor);
            })
        }
        JobsCommand::Approve { id } => {
            let job = client.approve_job(&JobId::from_string(id)).await?;
            print_job(&job, format)
        }
        JobsCommand::Abort { id } => {
            let job = client.abort_job(&JobId::from_string(id)).await?;
            print_job(&job, format)
        }
    }
}

fn print_job(job: &oj_core::Job, format: OutputFormat) -> anyhow::Result<()> {
    format_or_json(format, job, || {
        println!("{} {} {}", crate::color::header(job.id.as_str()), job.kind, job.status);
        if let Some(result) = &job.result_text {
            println!("{}", result);
        }
        if let Some(error) = &job.error {
            println!("{}: {}", crate::color::muted("error"), error);
        }
    })
}
