// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runbook-wide settings sections

use mf_core::BuildTarget;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_backoff() -> Duration {
    Duration::from_secs(30)
}

fn default_cancel_grace() -> Duration {
    Duration::from_secs(60)
}

fn default_interval() -> Duration {
    Duration::from_secs(2)
}

/// `[queue]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Sleep between attempts while the shared resource is busy
    #[serde(default = "default_backoff", with = "humantime_serde")]
    pub backoff: Duration,
    /// How long a cancelled build may take before it is reported unresponsive
    #[serde(default = "default_cancel_grace", with = "humantime_serde")]
    pub cancel_grace: Duration,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            backoff: default_backoff(),
            cancel_grace: default_cancel_grace(),
        }
    }
}

/// `[progress]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSettings {
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            interval: default_interval(),
        }
    }
}

/// `[guard]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuardSettings {
    /// `pgrep -f` pattern; `{target}` is replaced with the build target
    #[serde(default)]
    pub process_pattern: Option<String>,
}

/// `[target]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetLists {
    #[serde(default)]
    pub development: Vec<String>,
    #[serde(default)]
    pub release_candidate: Vec<String>,
    #[serde(default)]
    pub release: Vec<String>,
    #[serde(default)]
    pub restore: Vec<String>,
}

impl TargetLists {
    pub fn for_target(&self, target: BuildTarget) -> &[String] {
        match target {
            BuildTarget::Development => &self.development,
            BuildTarget::ReleaseCandidate => &self.release_candidate,
            BuildTarget::Release => &self.release,
        }
    }

    /// Every list with its section key, for validation messages
    pub(crate) fn named_lists(&self) -> [(&'static str, &[String]); 4] {
        [
            ("development", &self.development),
            ("release_candidate", &self.release_candidate),
            ("release", &self.release),
            ("restore", &self.restore),
        ]
    }
}
