// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-delimited JSON messages exchanged with the agent child process.
//!
//! Outgoing requests are built as plain `serde_json::Value` objects (the
//! wire shape is small and varies per command, so a typed enum would buy
//! little). Incoming lines are parsed once into `Value` and dispatched on
//! their `type` field.

use serde_json::{json, Value};

pub fn prompt_request(id: &str, message: &str) -> Value {
    json!({ "type": "prompt", "id": id, "message": message })
}

pub fn get_last_assistant_text_request(id: &str) -> Value {
    json!({ "type": "get_last_assistant_text", "id": id })
}

pub fn abort_request(id: &str) -> Value {
    json!({ "type": "abort", "id": id })
}

pub fn extension_ui_response(id: &str) -> Value {
    json!({ "type": "extension_ui_response", "id": id, "cancelled": true })
}

/// A parsed line from the child, dispatched by its `type` field.
#[derive(Debug, Clone)]
pub enum Incoming {
    /// `{type:"response", id, success, error?, data?}` — resolves a pending request.
    Response { id: String, value: Value },
    /// `{type:"extension_ui_request", id, method}` — always answered with `cancelled:true`.
    ExtensionUiRequest { id: String },
    /// `{type:"message_update", assistantMessageEvent:{type:"text_delta", delta}}`.
    TextDelta(String),
    ToolStart(String),
    ToolEnd(String),
    AgentEnd,
    /// Anything else: forwarded as a generic broadcast event (ignored by
    /// the prompt lifecycle, useful for future event types).
    Other(Value),
}

pub fn parse_line(line: &str) -> Result<Incoming, serde_json::Error> {
    let value: Value = serde_json::from_str(line)?;
    let ty = value.get("type").and_then(Value::as_str).unwrap_or_default();
    Ok(match ty {
        "response" => {
            let id = value.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
            Incoming::Response { id, value }
        }
        "extension_ui_request" => {
            let id = value.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
            Incoming::ExtensionUiRequest { id }
        }
        "message_update" => {
            let delta = value
                .get("assistantMessageEvent")
                .filter(|event| event.get("type").and_then(Value::as_str) == Some("text_delta"))
                .and_then(|event| event.get("delta"))
                .and_then(Value::as_str);
            match delta {
                Some(delta) => Incoming::TextDelta(delta.to_string()),
                None => Incoming::Other(value),
            }
        }
        "tool_execution_start" => {
            let name = value.get("toolName").and_then(Value::as_str).unwrap_or_default().to_string();
            Incoming::ToolStart(name)
        }
        "tool_execution_end" => {
            let name = value.get("toolName").and_then(Value::as_str).unwrap_or_default().to_string();
            Incoming::ToolEnd(name)
        }
        "agent_end" => Incoming::AgentEnd,
        _ => Incoming::Other(value),
    })
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
