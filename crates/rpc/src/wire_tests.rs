// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_response_by_id() {
    let line = r#"{"type":"response","id":"req-1","success":true,"data":{"text":"hi"}}"#;
    match parse_line(line).expect("parses") {
        Incoming::Response { id, value } => {
            assert_eq!(id, "req-1");
            assert_eq!(value["data"]["text"], "hi");
        }
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn parses_extension_ui_request() {
    let line = r#"{"type":"extension_ui_request","id":"ui-1","method":"confirm"}"#;
    match parse_line(line).expect("parses") {
        Incoming::ExtensionUiRequest { id } => assert_eq!(id, "ui-1"),
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn parses_text_delta() {
    let line = r#"{"type":"message_update","assistantMessageEvent":{"type":"text_delta","delta":"hello"}}"#;
    match parse_line(line).expect("parses") {
        Incoming::TextDelta(delta) => assert_eq!(delta, "hello"),
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn non_text_delta_message_update_is_other() {
    let line = r#"{"type":"message_update","assistantMessageEvent":{"type":"thinking_delta","delta":"x"}}"#;
    match parse_line(line).expect("parses") {
        Incoming::Other(_) => {}
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn parses_tool_start_and_end() {
    assert!(matches!(
        parse_line(r#"{"type":"tool_execution_start","toolName":"read_file"}"#).expect("parses"),
        Incoming::ToolStart(name) if name == "read_file"
    ));
    assert!(matches!(
        parse_line(r#"{"type":"tool_execution_end","toolName":"read_file"}"#).expect("parses"),
        Incoming::ToolEnd(name) if name == "read_file"
    ));
}

#[test]
fn parses_agent_end() {
    assert!(matches!(parse_line(r#"{"type":"agent_end"}"#).expect("parses"), Incoming::AgentEnd));
}

#[test]
fn unknown_type_is_other() {
    assert!(matches!(parse_line(r#"{"type":"something_else"}"#).expect("parses"), Incoming::Other(_)));
}

#[test]
fn malformed_json_is_error() {
    assert!(parse_line("not json").is_err());
}

#[test]
fn extension_ui_response_is_always_cancelled() {
    let value = extension_ui_response("ui-1");
    assert_eq!(value["cancelled"], true);
    assert_eq!(value["id"], "ui-1");
}
