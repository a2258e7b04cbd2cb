// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod admin;
pub mod jobs;
pub mod proactive;
pub mod tools;

/// Reads a JSON document from `--file <path>`, or stdin when `file` is `-`
/// or unset. Used by the proactive rule mutation commands, which accept a
/// full rule body rather than growing a parallel set of per-field flags.
pub fn read_json_arg<T: serde::de::DeserializeOwned>(file: Option<&std::path::Path>) -> anyhow::Result<T> {
    let raw = match file {
        Some(path) if path != std::path::Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            use std::io::Read;
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&raw)?)
}
