// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persists the proactive config to its JSON file, temp-file-then-rename,
//! the same atomicity contract `oj-storage` uses for the job store.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use oj_proactive::{ConfigSink, ProactiveConfig};

pub struct FileConfigSink {
    path: PathBuf,
}

impl FileConfigSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load_or_default(path: &PathBuf) -> ProactiveConfig {
        match fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                tracing::warn!(path = %path.display(), error = %err, "proactive config unreadable, starting from default");
                ProactiveConfig::default()
            }),
            Err(_) => ProactiveConfig::default(),
        }
    }
}

impl ConfigSink for FileConfigSink {
    fn persist(&self, config: &ProactiveConfig) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let tmp_path = self.path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(config)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        let mut file = File::create(&tmp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&tmp_path, &self.path)
    }
}
