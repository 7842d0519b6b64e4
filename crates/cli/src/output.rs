// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use mf_adapters::BuildRecord;
use mf_core::BuildStep;
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print a value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `[index] name status`
pub fn step_line(step: &BuildStep) -> String {
    format!("[{}] {} {}", step.index, step.name, step.status)
}

/// Step summary lines followed by the `Build <id>: <status>` line
pub fn summary(record: &BuildRecord) -> String {
    let mut out = String::new();
    for step in &record.steps {
        let _ = writeln!(out, "{}", step_line(step));
    }
    let _ = write!(out, "Build {}: {}", record.id, record.status);
    out
}

/// Full text view of a stored build, including step logs
pub fn details(record: &BuildRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Build: {}", record.id);
    let _ = writeln!(out, "  Status: {}", record.status);
    if let Some(at) = record.started_at {
        let _ = writeln!(out, "  Started: {}", at.to_rfc3339());
    }
    if let Some(at) = record.finished_at {
        let _ = writeln!(out, "  Finished: {}", at.to_rfc3339());
    }
    if !record.environment.is_empty() {
        let _ = writeln!(out, "  Environment:");
        for (k, v) in &record.environment {
            let _ = writeln!(out, "    {}={}", k, v);
        }
    }
    for step in &record.steps {
        let _ = writeln!(out, "{}", step_line(step));
        for entry in &step.log {
            let _ = writeln!(out, "    {}", entry.text);
        }
    }
    out
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
