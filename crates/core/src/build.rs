// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build records and the partial updates used to persist them

use crate::step::{BuildStep, StepStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Named environment variables shared across the steps of one build
pub type Environment = BTreeMap<String, String>;

/// Unique identifier for a build
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildId(pub String);

impl BuildId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BuildId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Environment a build is produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildTarget {
    Development,
    ReleaseCandidate,
    Release,
}

impl BuildTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildTarget::Development => "development",
            BuildTarget::ReleaseCandidate => "release_candidate",
            BuildTarget::Release => "release",
        }
    }

    pub fn is_release(&self) -> bool {
        matches!(self, BuildTarget::Release)
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown build target: {0}")]
pub struct ParseTargetError(pub String);

impl FromStr for BuildTarget {
    type Err = ParseTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "development" | "dev" => Ok(BuildTarget::Development),
            "release_candidate" | "rc" => Ok(BuildTarget::ReleaseCandidate),
            "release" => Ok(BuildTarget::Release),
            _ => Err(ParseTargetError(s.to_string())),
        }
    }
}

/// Overall status of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    #[default]
    Pending,
    Running,
    Succeeded,
    Warning,
    Failed,
    Cancelled,
}

impl BuildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::Pending => "pending",
            BuildStatus::Running => "running",
            BuildStatus::Succeeded => "succeeded",
            BuildStatus::Warning => "warning",
            BuildStatus::Failed => "failed",
            BuildStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BuildStatus::Pending | BuildStatus::Running)
    }

    /// Whether callers should treat this outcome as a usable artifact
    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Succeeded | BuildStatus::Warning)
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incremental change to a build's stored representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "snake_case")]
pub enum BuildUpdate {
    /// Build status changed
    Status {
        status: BuildStatus,
        at: DateTime<Utc>,
    },
    /// Environment variables changed (full map)
    Environment { environment: Environment },
    /// The ordered step list was resolved or extended
    StepsResolved { steps: Vec<BuildStep> },
}

impl BuildUpdate {
    pub fn name(&self) -> &'static str {
        match self {
            BuildUpdate::Status { .. } => "status",
            BuildUpdate::Environment { .. } => "environment",
            BuildUpdate::StepsResolved { .. } => "steps",
        }
    }
}

/// One orchestration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub id: BuildId,
    pub target: BuildTarget,
    pub version: String,
    pub status: BuildStatus,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub steps: Vec<BuildStep>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Build {
    pub fn new(id: BuildId, target: BuildTarget, version: impl Into<String>) -> Self {
        Self {
            id,
            target,
            version: version.into(),
            status: BuildStatus::Pending,
            environment: Environment::new(),
            steps: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Builder helper to seed an environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Final status derived from the step outcomes.
    ///
    /// Failure dominates cancellation, cancellation dominates warnings, and
    /// a warning on any step downgrades an otherwise clean build.
    pub fn aggregate_status(&self) -> BuildStatus {
        let statuses = || self.steps.iter().map(|s| s.status);
        if statuses().any(|s| s == StepStatus::Failed) {
            BuildStatus::Failed
        } else if statuses().any(|s| s == StepStatus::Cancelled) {
            BuildStatus::Cancelled
        } else if statuses().any(|s| s == StepStatus::Warning) {
            BuildStatus::Warning
        } else {
            BuildStatus::Succeeded
        }
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
