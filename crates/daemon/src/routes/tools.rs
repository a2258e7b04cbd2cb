// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/v1/tools*` — a small self-management tool surface over the proactive
//! runtime, shaped for a gateway's own tool-calling agent rather than a
//! human operator (who'd use the `/v1/proactive/*` endpoints directly).

use axum::extract::State;
use axum::Json;
use oj_proactive::{CronRule, HeartbeatRule};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::GatewayAuth;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
}

const TOOLS: &[ToolDescriptor] = &[
    ToolDescriptor { name: "cron.list", description: "list configured cron rules" },
    ToolDescriptor { name: "cron.add", description: "create or replace a cron rule" },
    ToolDescriptor { name: "cron.update", description: "create or replace a cron rule" },
    ToolDescriptor { name: "cron.remove", description: "delete a cron rule by id" },
    ToolDescriptor { name: "cron.run", description: "trigger a cron rule immediately" },
    ToolDescriptor { name: "heartbeat.list", description: "list configured heartbeat rules" },
    ToolDescriptor { name: "heartbeat.add", description: "create or replace a heartbeat rule" },
    ToolDescriptor { name: "heartbeat.update", description: "create or replace a heartbeat rule" },
    ToolDescriptor { name: "heartbeat.remove", description: "delete a heartbeat rule by id" },
    ToolDescriptor { name: "heartbeat.run", description: "trigger a heartbeat rule immediately" },
    ToolDescriptor { name: "proactive.runs", description: "list recent proactive trigger runs" },
];

pub async fn list_tools(_auth: GatewayAuth) -> Json<&'static [ToolDescriptor]> {
    Json(TOOLS)
}

#[derive(Debug, Deserialize)]
pub struct InvokeBody {
    pub tool: String,
    #[serde(default = "default_arguments")]
    pub arguments: serde_json::Value,
}

fn default_arguments() -> serde_json::Value {
    json!({})
}

#[derive(Debug, Deserialize)]
struct IdArg {
    id: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RunsArg {
    #[serde(default)]
    trigger_key: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    50
}

pub async fn invoke_tool(
    _auth: GatewayAuth,
    State(state): State<AppState>,
    Json(body): Json<InvokeBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = match body.tool.as_str() {
        "cron.list" => json!(state.proactive.config().cron_rules),
        "cron.add" | "cron.update" => {
            let rule: CronRule = parse_arguments(body.arguments)?;
            state.proactive.upsert_cron(rule)?;
            json!(state.proactive.config().cron_rules)
        }
        "cron.remove" => {
            let arg: IdArg = parse_arguments(body.arguments)?;
            state.proactive.delete_cron(&arg.id)?;
            json!({ "removed": arg.id })
        }
        "cron.run" => {
            let arg: IdArg = parse_arguments(body.arguments)?;
            let outcome = state.proactive.trigger_cron_now(&arg.id)?;
            json!({ "status": format!("{:?}", outcome.status), "jobId": outcome.job_id })
        }
        "heartbeat.list" => json!(state.proactive.config().heartbeat_rules),
        "heartbeat.add" | "heartbeat.update" => {
            let rule: HeartbeatRule = parse_arguments(body.arguments)?;
            state.proactive.upsert_heartbeat(rule)?;
            json!(state.proactive.config().heartbeat_rules)
        }
        "heartbeat.remove" => {
            let arg: IdArg = parse_arguments(body.arguments)?;
            state.proactive.delete_heartbeat(&arg.id)?;
            json!({ "removed": arg.id })
        }
        "heartbeat.run" => {
            let arg: IdArg = parse_arguments(body.arguments)?;
            let outcome = state.proactive.trigger_heartbeat_now(&arg.id)?;
            json!({ "status": format!("{:?}", outcome.status), "jobId": outcome.job_id })
        }
        "proactive.runs" => {
            let arg: RunsArg = parse_arguments(body.arguments)?;
            let runs = state.store.list_proactive_runs(arg.trigger_key.as_deref(), arg.limit);
            json!(runs)
        }
        other => return Err(ApiError::BadRequest(format!("unknown tool {other:?}"))),
    };
    Ok(Json(json!({ "ok": true, "result": result })))
}

fn parse_arguments<T: for<'de> Deserialize<'de>>(value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|err| ApiError::BadRequest(format!("invalid arguments: {err}")))
}
