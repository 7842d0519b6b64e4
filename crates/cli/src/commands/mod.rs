// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod run;
pub mod show;
pub mod steps;

use anyhow::{Context, Result};
use mf_runbook::{load_runbook, Runbook, DEFAULT_RUNBOOK_FILE};
use std::path::{Path, PathBuf};

/// Location of per-build JSON snapshots, relative to the runbook directory
pub const DEFAULT_STATE_DIR: &str = ".mf/builds";

/// Load the runbook at `path`, or `mf.toml` in the working directory
pub fn open_runbook(path: Option<&Path>) -> Result<Runbook> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RUNBOOK_FILE));
    load_runbook(&path).with_context(|| format!("loading runbook {}", path.display()))
}

pub fn state_dir(runbook_dir: &Path, explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| runbook_dir.join(DEFAULT_STATE_DIR))
}

/// Parse `KEY=VALUE`
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    let key = &s[..pos];
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.to_string(), s[pos + 1..].to_string()))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
