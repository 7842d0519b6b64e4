// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step definitions

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout for one external command
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Steps implemented inside the engine rather than by an external command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinStep {
    Lock,
    Unlock,
    Notify,
}

/// What a step runs: an executable or a builtin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunDirective {
    /// Path or name of an executable
    Command(String),
    /// A builtin step
    Builtin { builtin: BuiltinStep },
}

impl RunDirective {
    pub fn is_command(&self) -> bool {
        matches!(self, RunDirective::Command(_))
    }

    pub fn builtin(&self) -> Option<BuiltinStep> {
        match self {
            RunDirective::Builtin { builtin } => Some(*builtin),
            RunDirective::Command(_) => None,
        }
    }
}

/// Step category used by the restore cascade
///
/// A failed `backup` or `cleanup` step does not start another restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    #[default]
    Work,
    Backup,
    Cleanup,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Work => "work",
            StepKind::Backup => "backup",
            StepKind::Cleanup => "cleanup",
        }
    }

    pub fn is_restorative(&self) -> bool {
        matches!(self, StepKind::Backup | StepKind::Cleanup)
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delimiters of a region whose error lines are ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreBlock {
    pub open: String,
    pub close: String,
}

fn default_timeout() -> Duration {
    DEFAULT_STEP_TIMEOUT
}

fn default_true() -> bool {
    true
}

/// A `[step.<name>]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDef {
    /// Filled from the table key
    #[serde(skip)]
    pub name: String,
    pub run: RunDirective,
    #[serde(default)]
    pub args: String,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(default)]
    pub kind: Option<StepKind>,
    /// Environment variables that must be set and non-empty
    #[serde(default)]
    pub requires: Vec<String>,
    /// Environment variable receiving the last plain output line
    #[serde(default)]
    pub capture: Option<String>,
    #[serde(default)]
    pub ignore_errors: Vec<String>,
    #[serde(default)]
    pub ignore_block: Option<IgnoreBlock>,
    #[serde(default = "default_true")]
    pub fail_on_stderr: bool,
    #[serde(default)]
    pub diagnostics: bool,
    #[serde(default)]
    pub lock_file: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl StepDef {
    /// A command step with default settings
    pub fn command(name: impl Into<String>, executable: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            run: RunDirective::Command(executable.into()),
            args: String::new(),
            cwd: None,
            timeout: DEFAULT_STEP_TIMEOUT,
            kind: None,
            requires: Vec::new(),
            capture: None,
            ignore_errors: Vec::new(),
            ignore_block: None,
            fail_on_stderr: true,
            diagnostics: false,
            lock_file: None,
            channel: None,
            message: None,
        }
    }

    /// Effective category; unlock steps are cleanup unless stated otherwise
    pub fn category(&self) -> StepKind {
        match (self.kind, self.run.builtin()) {
            (Some(kind), _) => kind,
            (None, Some(BuiltinStep::Unlock)) => StepKind::Cleanup,
            (None, _) => StepKind::Work,
        }
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
