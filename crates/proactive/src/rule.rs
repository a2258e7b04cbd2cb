// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Proactive config schema: heartbeat rules, cron rules, and webhook rules,
//! each carrying a [`Target`] and (for heartbeat/cron) a [`DeliveryMode`].

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cron_expr;
use crate::error::ProactiveError;

pub const MIN_HEARTBEAT_EVERY_SECONDS: u64 = 5;
pub const MAX_HEARTBEAT_EVERY_SECONDS: u64 = 86_400;
pub const MIN_WEBHOOK_SECRET_CHARS: usize = 16;
pub const DEFAULT_WEBHOOK_PAYLOAD_MAX_CHARS: usize = 8_000;

/// Where a triggered job is routed: which channel/chat it belongs to and
/// whether it needs approval before running.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub kind: String,
    pub chat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    pub requester_id: String,
    pub session_key: String,
    #[serde(default)]
    pub requires_approval: bool,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

/// How a terminal proactive job's result reaches the outside world.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DeliveryMode {
    Announce,
    Webhook { webhook_url: String },
    None,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionTarget {
    Main,
    Isolated,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum WakeMode {
    Now,
    NextHeartbeat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRule {
    pub id: String,
    pub every_seconds: u64,
    pub prompt: String,
    pub delivery: DeliveryMode,
    pub target: Target,
}

impl HeartbeatRule {
    fn validate(&self) -> Result<(), ProactiveError> {
        if self.id.is_empty() {
            return Err(ProactiveError::InvalidConfig("heartbeat rule id must not be empty".to_string()));
        }
        if !(MIN_HEARTBEAT_EVERY_SECONDS..=MAX_HEARTBEAT_EVERY_SECONDS).contains(&self.every_seconds) {
            return Err(ProactiveError::InvalidConfig(format!(
                "heartbeat rule {} everySeconds must be in [{MIN_HEARTBEAT_EVERY_SECONDS}, {MAX_HEARTBEAT_EVERY_SECONDS}]",
                self.id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CronRule {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub every_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    pub session_target: SessionTarget,
    pub wake_mode: WakeMode,
    pub prompt: String,
    pub delivery: DeliveryMode,
    pub target: Target,
}

impl CronRule {
    fn validate(&self) -> Result<(), ProactiveError> {
        if self.id.is_empty() {
            return Err(ProactiveError::InvalidConfig("cron rule id must not be empty".to_string()));
        }
        let variants = [self.cron.is_some(), self.at.is_some(), self.every_seconds.is_some()];
        if variants.iter().filter(|v| **v).count() != 1 {
            return Err(ProactiveError::InvalidConfig(format!(
                "cron rule {} must set exactly one of cron, at, everySeconds",
                self.id
            )));
        }
        if let Some(expr) = &self.cron {
            cron_expr::validate(expr)?;
        }
        if let Some(secs) = self.every_seconds {
            if secs == 0 {
                return Err(ProactiveError::InvalidConfig(format!(
                    "cron rule {} everySeconds must be > 0",
                    self.id
                )));
            }
        }
        if let Some(tz) = &self.timezone {
            tz.parse::<chrono_tz::Tz>()
                .map_err(|_| ProactiveError::InvalidConfig(format!("cron rule {} has invalid timezone {tz:?}", self.id)))?;
        }
        if self.wake_mode == WakeMode::NextHeartbeat && self.session_target != SessionTarget::Main {
            return Err(ProactiveError::InvalidConfig(format!(
                "cron rule {} wakeMode next-heartbeat requires sessionTarget main",
                self.id
            )));
        }
        Ok(())
    }

    pub fn resolved_timezone(&self) -> chrono_tz::Tz {
        self.timezone.as_deref().and_then(|tz| tz.parse().ok()).unwrap_or(chrono_tz::Tz::UTC)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRule {
    pub id: String,
    pub secret: String,
    pub prompt: String,
    #[serde(default)]
    pub include_payload_in_prompt: bool,
    pub target: Target,
}

impl WebhookRule {
    fn validate(&self) -> Result<(), ProactiveError> {
        if self.id.is_empty() {
            return Err(ProactiveError::InvalidConfig("webhook rule id must not be empty".to_string()));
        }
        if self.secret.len() < MIN_WEBHOOK_SECRET_CHARS {
            return Err(ProactiveError::InvalidConfig(format!(
                "webhook rule {} secret must be at least {MIN_WEBHOOK_SECRET_CHARS} chars",
                self.id
            )));
        }
        Ok(())
    }
}

fn default_webhook_payload_max_chars() -> usize {
    DEFAULT_WEBHOOK_PAYLOAD_MAX_CHARS
}

fn default_enabled() -> bool {
    true
}

/// The whole proactive config file: `{enabled, tickMs, heartbeatRules[],
/// cronRules[], webhooks[], webhookPayloadMaxChars}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProactiveConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default)]
    pub heartbeat_rules: Vec<HeartbeatRule>,
    #[serde(default)]
    pub cron_rules: Vec<CronRule>,
    #[serde(default)]
    pub webhooks: Vec<WebhookRule>,
    #[serde(default = "default_webhook_payload_max_chars")]
    pub webhook_payload_max_chars: usize,
}

fn default_tick_ms() -> u64 {
    5_000
}

impl Default for ProactiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_ms: default_tick_ms(),
            heartbeat_rules: Vec::new(),
            cron_rules: Vec::new(),
            webhooks: Vec::new(),
            webhook_payload_max_chars: DEFAULT_WEBHOOK_PAYLOAD_MAX_CHARS,
        }
    }
}

impl ProactiveConfig {
    /// Validates every rule and rejects duplicate ids across all three
    /// namespaces (heartbeat, cron, webhook share one id space).
    pub fn validate(&self) -> Result<(), ProactiveError> {
        let mut seen = HashSet::new();
        for rule in &self.heartbeat_rules {
            rule.validate()?;
            if !seen.insert(rule.id.clone()) {
                return Err(ProactiveError::InvalidConfig(format!("duplicate rule id: {}", rule.id)));
            }
        }
        for rule in &self.cron_rules {
            rule.validate()?;
            if !seen.insert(rule.id.clone()) {
                return Err(ProactiveError::InvalidConfig(format!("duplicate rule id: {}", rule.id)));
            }
        }
        for rule in &self.webhooks {
            rule.validate()?;
            if !seen.insert(rule.id.clone()) {
                return Err(ProactiveError::InvalidConfig(format!("duplicate rule id: {}", rule.id)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod tests;
