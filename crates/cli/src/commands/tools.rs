// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `oj tools ...` — the gateway's self-management tool surface (§6.3).

use std::io::Write;

use clap::Subcommand;

use crate::client::Client;
use crate::output::{format_or_json, handle_list, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ToolsCommand {
    /// List the tools the gateway's own agent can invoke.
    List,
    /// Invoke a tool by name with a JSON arguments object.
    Invoke {
        tool: String,
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

pub async fn run(client: &Client, command: ToolsCommand, format: OutputFormat) -> anyhow::Result<()> {
    match command {
        ToolsCommand::List => {
            let tools = client.list_tools().await?;
            handle_list(format, &tools, "no tools available", |tools, out| {
                for tool in tools {
                    let _ = writeln!(out, "{:<20} {}", tool.name, tool.description);
                }
            })
        }
        ToolsCommand::Invoke { tool, args } => {
            let arguments: serde_json::Value = serde_json::from_str(&args)?;
            let result = client.invoke_tool(&tool, arguments).await?;
            format_or_json(format, &result, || println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default()))
        }
    }
}
