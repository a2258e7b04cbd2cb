// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evaluates a single tool invocation against the layered policy.

use oj_core::JobKind;
use serde::Serialize;

use crate::config::ToolPolicyConfig;
use crate::pattern::Pattern;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    MatchedDenyRule,
    AllowlistEmpty,
    NotInAllowlist,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDecision {
    pub allowed: bool,
    pub reason: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_deny_pattern: Option<String>,
}

impl PolicyDecision {
    fn allow() -> Self {
        Self { allowed: true, reason: "allowed", matched_deny_pattern: None }
    }

    fn deny(reason: DenyReason, matched_deny_pattern: Option<String>) -> Self {
        let reason = match reason {
            DenyReason::MatchedDenyRule => "matched_deny_rule",
            DenyReason::AllowlistEmpty => "allowlist_empty",
            DenyReason::NotInAllowlist => "not_in_allowlist",
        };
        Self { allowed: false, reason, matched_deny_pattern }
    }
}

pub struct ToolPolicyRuntime {
    config: ToolPolicyConfig,
}

impl ToolPolicyRuntime {
    /// A missing config (the default) allows every tool.
    pub fn new(config: ToolPolicyConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, tool_name: &str, kind: JobKind, profile_id: Option<&str>) -> PolicyDecision {
        let mut deny: Vec<Pattern> = Vec::new();
        let mut allow: Option<Vec<Pattern>> = None;

        let mut apply = |layer: &crate::config::PolicyLayer| {
            if let Some(patterns) = &layer.deny {
                deny.extend(patterns.iter().map(Pattern::new));
            }
            if let Some(patterns) = &layer.allow {
                allow = Some(patterns.iter().map(Pattern::new).collect());
            }
        };

        if let Some(layer) = &self.config.default {
            apply(layer);
        }
        let kind_layer = match kind {
            JobKind::Task => &self.config.by_kind.task,
            JobKind::Run => &self.config.by_kind.run,
        };
        if let Some(layer) = kind_layer {
            apply(layer);
        }
        if let Some(profile_id) = profile_id {
            if let Some(layer) = self.config.by_profile.get(profile_id) {
                apply(layer);
            }
        }

        if let Some(pattern) = deny.iter().find(|p| p.matches(tool_name)) {
            return PolicyDecision::deny(DenyReason::MatchedDenyRule, Some(pattern.as_str().to_string()));
        }

        match &allow {
            Some(patterns) if patterns.is_empty() => {
                PolicyDecision::deny(DenyReason::AllowlistEmpty, None)
            }
            Some(patterns) if !patterns.iter().any(|p| p.matches(tool_name)) => {
                PolicyDecision::deny(DenyReason::NotInAllowlist, None)
            }
            _ => PolicyDecision::allow(),
        }
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
