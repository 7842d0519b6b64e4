// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build step records
//!
//! A [`BuildStep`] is the persisted view of one named unit of work. The
//! engine's step lifecycle is the only writer; everything else reads
//! snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display colours attached to step log entries
pub mod colour {
    pub const PLAIN: &str = "";
    pub const INFO: &str = "#0c78ff";
    pub const SUCCESS: &str = "#20d420";
    pub const WARNING: &str = "#C8c800";
    pub const ERROR: &str = "#d92020";
    pub const SKIPPED: &str = "#808080";
}

/// Result status of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Succeeded,
    Warning,
    Failed,
    Cancelled,
    Skipped,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Succeeded => "succeeded",
            StepStatus::Warning => "warning",
            StepStatus::Failed => "failed",
            StepStatus::Cancelled => "cancelled",
            StepStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line in a step's log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepLogEntry {
    pub text: String,
    pub colour: String,
}

impl StepLogEntry {
    pub fn new(text: impl Into<String>, colour: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            colour: colour.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, colour::PLAIN)
    }
}

/// One named unit of work within a build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildStep {
    pub name: String,
    pub index: usize,
    pub running: bool,
    pub finished: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: StepStatus,
    #[serde(default)]
    pub log: Vec<StepLogEntry>,
}

impl BuildStep {
    pub fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
            running: false,
            finished: false,
            started_at: None,
            finished_at: None,
            status: StepStatus::Pending,
            log: Vec::new(),
        }
    }

    /// Append a log entry
    pub fn push_log(&mut self, entry: StepLogEntry) {
        self.log.push(entry);
    }

    /// Record the step's terminal outcome.
    ///
    /// A warning recorded earlier in the run survives a plain success; any
    /// other outcome replaces it.
    pub fn record_outcome(&mut self, outcome: StepStatus) {
        if self.status == StepStatus::Warning && outcome == StepStatus::Succeeded {
            return;
        }
        self.status = outcome;
    }

    /// Mark the step as running from `at`
    pub fn mark_started(&mut self, at: DateTime<Utc>) {
        self.running = true;
        self.started_at = Some(at);
    }

    /// Mark the step as stopped at `at`
    pub fn mark_stopped(&mut self, at: DateTime<Utc>) {
        self.running = false;
        self.finished = true;
        self.finished_at = Some(at);
    }

    pub fn is_failed(&self) -> bool {
        self.status == StepStatus::Failed
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
