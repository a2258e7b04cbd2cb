// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A small 5-field cron expression matcher: `minute hour dom month dow`.
//!
//! Supports `*`, `*/step`, `a-b`, `a-b/step`, single values, and
//! comma-separated lists of any of the above. No external cron crate is
//! pulled in for this — the field grammar is small enough to hand-roll and
//! the spec's "fires at most once per UTC-minute key" dedupe needs direct
//! access to the parsed field sets anyway (the teacher's pack glob matcher
//! in `oj-policy::pattern` takes the same approach for the same reason).

use chrono::{Datelike, TimeZone, Timelike};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CronExprError {
    #[error("cron expression must have exactly 5 fields, got {0}")]
    WrongFieldCount(usize),
    #[error("invalid cron field {field:?}: {reason}")]
    InvalidField { field: String, reason: String },
}

#[derive(Debug, Clone)]
pub struct CronFields {
    minute: Vec<u32>,
    hour: Vec<u32>,
    dom: Vec<u32>,
    month: Vec<u32>,
    dow: Vec<u32>,
}

impl CronFields {
    pub fn parse(expr: &str) -> Result<Self, CronExprError> {
        let parts: Vec<&str> = expr.split_whitespace().collect();
        if parts.len() != 5 {
            return Err(CronExprError::WrongFieldCount(parts.len()));
        }
        Ok(Self {
            minute: parse_field(parts[0], 0, 59)?,
            hour: parse_field(parts[1], 0, 23)?,
            dom: parse_field(parts[2], 1, 31)?,
            month: parse_field(parts[3], 1, 12)?,
            dow: parse_field(parts[4], 0, 7)?.into_iter().map(|d| if d == 7 { 0 } else { d }).collect(),
        })
    }

    /// Whether the given wall-clock instant (already converted to the
    /// rule's timezone) matches this expression's minute/hour/dom/month/dow.
    pub fn matches<Tz: TimeZone>(&self, at: &chrono::DateTime<Tz>) -> bool {
        self.minute.contains(&at.minute())
            && self.hour.contains(&at.hour())
            && self.dom.contains(&at.day())
            && self.month.contains(&at.month())
            && self.dow.contains(&at.weekday().num_days_from_sunday())
    }
}

/// Validates `expr` without returning the parsed fields; used by config
/// validation, which only needs to reject malformed input up front.
pub fn validate(expr: &str) -> Result<(), CronExprError> {
    CronFields::parse(expr).map(|_| ())
}

fn parse_field(spec: &str, min: u32, max: u32) -> Result<Vec<u32>, CronExprError> {
    let mut values = Vec::new();
    for token in spec.split(',') {
        values.extend(parse_token(token, min, max)?);
    }
    values.sort_unstable();
    values.dedup();
    Ok(values)
}

fn parse_token(token: &str, min: u32, max: u32) -> Result<Vec<u32>, CronExprError> {
    let field_err = |reason: String| CronExprError::InvalidField { field: token.to_string(), reason };

    let (range_part, step) = match token.split_once('/') {
        Some((range_part, step)) => {
            let step: u32 = step.parse().map_err(|_| field_err(format!("invalid step {step:?}")))?;
            if step == 0 {
                return Err(field_err("step must be > 0".to_string()));
            }
            (range_part, Some(step))
        }
        None => (token, None),
    };

    let (lo, hi) = if range_part == "*" {
        (min, max)
    } else if let Some((a, b)) = range_part.split_once('-') {
        let a: u32 = a.parse().map_err(|_| field_err(format!("invalid range start {a:?}")))?;
        let b: u32 = b.parse().map_err(|_| field_err(format!("invalid range end {b:?}")))?;
        if a > b || a < min || b > max {
            return Err(field_err(format!("range {a}-{b} out of bounds {min}-{max}")));
        }
        (a, b)
    } else {
        let v: u32 = range_part.parse().map_err(|_| field_err(format!("invalid value {range_part:?}")))?;
        if v < min || v > max {
            return Err(field_err(format!("value {v} out of bounds {min}-{max}")));
        }
        (v, v)
    };

    let step = step.unwrap_or(1);
    Ok((lo..=hi).step_by(step as usize).collect())
}

#[cfg(test)]
#[path = "cron_expr_tests.rs"]
mod tests;
