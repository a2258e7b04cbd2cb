// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Atomic whole-file persistence: write to a sibling temp file, fsync, then
//! rename over the canonical path. No WAL, no incremental replay — the store
//! holds one JSON blob and rewrites it in full on every mutation.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::StoreError;

/// Serialize `value` and atomically replace the file at `path`.
///
/// The temp file lives next to `path` (same directory, same filesystem) so
/// the final `rename` is a single metadata update rather than a copy.
pub(crate) fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let tmp_path = tmp_path_for(path);
    let bytes = serde_json::to_vec_pretty(value)?;

    let mut file = File::create(&tmp_path)?;
    file.write_all(&bytes)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load and deserialize the file at `path`. Returns `Ok(None)` when the file
/// is missing; a malformed file is surfaced as [`StoreError::Serde`] so
/// callers can decide whether to fall back to an empty state or bail.
pub(crate) fn read_json<T: serde::de::DeserializeOwned>(
    path: &Path,
) -> Result<Option<T>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn tmp_path_for(path: &Path) -> std::path::PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "state".to_string());
    path.with_file_name(format!("{file_name}.tmp-{}", std::process::id()))
}

#[cfg(test)]
#[path = "atomic_tests.rs"]
mod tests;
