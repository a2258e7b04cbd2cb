// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The guard conditions that decide whether a failed attempt may retry on
//! the next profile in a route chain.

/// Case-insensitive substrings of an error message that mark a failure as
/// transport/provider-level and therefore retryable on a fallback profile.
pub const RETRYABLE_SUBSTRINGS: &[&str] = &[
    "rate limit",
    "timeout",
    "timed out",
    "connection reset",
    "connection refused",
    "econnreset",
    "ehostunreach",
    "etimedout",
    "429",
    "503",
    "502",
    "provider",
    "model",
    "authentication",
    "auth",
    "api key",
];

#[derive(Debug, Clone, Default)]
pub struct FallbackInput {
    pub abort_requested: bool,
    pub attempt_had_output: bool,
    pub attempt_had_tool_activity: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackOutcome {
    pub fallback: bool,
    pub reason: String,
}

impl FallbackOutcome {
    fn no(reason: &str) -> Self {
        Self { fallback: false, reason: reason.to_string() }
    }
}

/// Pure decision logic for `evaluateFallback`, split out from
/// [`crate::runtime::ModelRoutingRuntime`] so the guard order is testable
/// without standing up a runtime or a cooldown clock.
pub fn decide(input: &FallbackInput, cooldown_seconds: u64) -> FallbackOutcome {
    if input.abort_requested {
        return FallbackOutcome::no("abort_requested");
    }
    if input.attempt_had_tool_activity {
        return FallbackOutcome::no("tool_activity_detected");
    }
    if input.attempt_had_output {
        return FallbackOutcome::no("partial_output_detected");
    }
    let matched = input
        .error_message
        .as_deref()
        .map(|message| {
            let lower = message.to_lowercase();
            RETRYABLE_SUBSTRINGS.iter().any(|pattern| lower.contains(pattern))
        })
        .unwrap_or(false);
    if !matched {
        return FallbackOutcome::no("error_not_retryable");
    }
    FallbackOutcome { fallback: true, reason: format!("retryable_error_profile_cooldown_{cooldown_seconds}s") }
}

#[cfg(test)]
#[path = "fallback_tests.rs"]
mod tests;
