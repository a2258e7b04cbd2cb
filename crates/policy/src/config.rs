// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tool policy configuration: layered allow/deny rules scoped by job kind
//! and model profile.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyLayer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByKind {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<PolicyLayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<PolicyLayer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPolicyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<PolicyLayer>,
    #[serde(default)]
    pub by_kind: ByKind,
    #[serde(default)]
    pub by_profile: HashMap<String, PolicyLayer>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("policy pattern for {layer} must not be empty")]
    EmptyPattern { layer: String },
}

impl ToolPolicyConfig {
    /// Empty-string patterns are rejected up front; everything else
    /// (including an absent config entirely) is accepted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut named: Vec<(String, &PolicyLayer)> = Vec::new();
        if let Some(layer) = &self.default {
            named.push(("default".to_string(), layer));
        }
        if let Some(layer) = &self.by_kind.task {
            named.push(("byKind.task".to_string(), layer));
        }
        if let Some(layer) = &self.by_kind.run {
            named.push(("byKind.run".to_string(), layer));
        }
        for (id, layer) in &self.by_profile {
            named.push((format!("byProfile.{id}"), layer));
        }

        for (name, layer) in named {
            for pattern in layer.allow.iter().flatten().chain(layer.deny.iter().flatten()) {
                if pattern.is_empty() {
                    return Err(ConfigError::EmptyPattern { layer: name });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
