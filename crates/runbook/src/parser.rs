// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runbook TOML parsing

use crate::settings::{GuardSettings, ProgressSettings, QueueSettings, TargetLists};
use crate::step::{BuiltinStep, StepDef};
use mf_core::BuildTarget;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up when no runbook path is given
pub const DEFAULT_RUNBOOK_FILE: &str = "mf.toml";

/// Errors that can occur during runbook parsing
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("failed to read runbook {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("target.{list} names unknown step: {step}")]
    UnknownStep { list: String, step: String },
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

#[derive(Deserialize)]
struct RawRunbook {
    #[serde(default)]
    queue: QueueSettings,
    #[serde(default)]
    progress: ProgressSettings,
    #[serde(default)]
    guard: GuardSettings,
    #[serde(default)]
    target: TargetLists,
    #[serde(default)]
    step: BTreeMap<String, StepDef>,
}

/// A parsed runbook
#[derive(Debug, Clone, Default)]
pub struct Runbook {
    pub queue: QueueSettings,
    pub progress: ProgressSettings,
    pub guard: GuardSettings,
    pub targets: TargetLists,
    pub steps: BTreeMap<String, StepDef>,
    /// Directory the runbook was loaded from; relative paths resolve here
    pub dir: PathBuf,
}

impl Runbook {
    /// Get a step definition by name
    pub fn get_step(&self, name: &str) -> Option<&StepDef> {
        self.steps.get(name)
    }

    /// Ordered step names for a build target
    pub fn steps_for(&self, target: BuildTarget) -> &[String] {
        self.targets.for_target(target)
    }

    /// Ordered restore step names
    pub fn restore_steps(&self) -> &[String] {
        &self.targets.restore
    }
}

/// Parse a runbook from TOML content
pub fn parse_runbook(content: &str) -> Result<Runbook, ParseError> {
    let raw: RawRunbook = toml::from_str(content)?;

    let mut steps = raw.step;
    for (name, def) in steps.iter_mut() {
        def.name = name.clone();
        validate_step(def)?;
    }

    for (list, names) in raw.target.named_lists() {
        if let Some(step) = names.iter().find(|n| !steps.contains_key(n.as_str())) {
            return Err(ParseError::UnknownStep {
                list: list.to_string(),
                step: step.clone(),
            });
        }
    }

    Ok(Runbook {
        queue: raw.queue,
        progress: raw.progress,
        guard: raw.guard,
        targets: raw.target,
        steps,
        dir: PathBuf::from("."),
    })
}

/// Read and parse a runbook file, recording its directory
pub fn load_runbook(path: &Path) -> Result<Runbook, ParseError> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut runbook = parse_runbook(&content)?;
    runbook.dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(runbook)
}

fn validate_step(def: &StepDef) -> Result<(), ParseError> {
    match def.run.builtin() {
        Some(BuiltinStep::Lock | BuiltinStep::Unlock) if def.lock_file.is_none() => Err(
            ParseError::MissingField(format!("step.{}.lock_file", def.name)),
        ),
        Some(BuiltinStep::Notify) if def.message.is_none() => Err(ParseError::MissingField(
            format!("step.{}.message", def.name),
        )),
        None if !def.args.is_empty() && def.args.matches('"').count() % 2 != 0 => Err(
            ParseError::InvalidFormat(format!("step.{}.args has an unterminated quote", def.name)),
        ),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
