// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-pattern resource guard

use super::{GuardError, ResourceGuard};
use async_trait::async_trait;
use mf_core::BuildTarget;
use tokio::process::Command;

/// Reports busy while any process matches a command-line pattern.
///
/// `{target}` in the pattern is replaced with the build target name, so
/// one pattern can cover per-environment server instances.
#[derive(Clone, Debug)]
pub struct ProcessPatternGuard {
    pattern: String,
}

impl ProcessPatternGuard {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// The pattern passed to `pgrep -f` for `target`
    pub fn pattern_for(&self, target: BuildTarget) -> String {
        self.pattern.replace("{target}", target.as_str())
    }
}

#[async_trait]
impl ResourceGuard for ProcessPatternGuard {
    async fn is_busy(&self, target: BuildTarget) -> Result<bool, GuardError> {
        let pattern = self.pattern_for(target);
        let output = Command::new("pgrep")
            .args(["-f", &pattern])
            .output()
            .await
            .map_err(|e| GuardError::CommandFailed(e.to_string()))?;

        // pgrep: 0 = matched, 1 = no match, anything else is an error
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(GuardError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            )),
        }
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
