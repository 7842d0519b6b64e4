// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mf steps --target <t>` - Print the steps a target would run

use super::open_runbook;
use anyhow::Result;
use clap::Args;
use mf_core::BuildTarget;
use mf_runbook::Runbook;
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Args)]
pub struct StepsArgs {
    /// Build target (development, release_candidate, release)
    #[arg(long, short)]
    pub target: BuildTarget,

    /// Runbook path (default: ./mf.toml)
    #[arg(long)]
    pub runbook: Option<PathBuf>,
}

pub fn steps(args: StepsArgs) -> Result<()> {
    let runbook = open_runbook(args.runbook.as_deref())?;
    print!("{}", listing(&runbook, args.target));
    Ok(())
}

/// One `[index] name (kind)` line per step; releases add the restore list
fn listing(runbook: &Runbook, target: BuildTarget) -> String {
    let mut out = String::new();
    let steps = runbook.steps_for(target);
    if steps.is_empty() {
        let _ = writeln!(out, "No steps for {}", target);
    }
    append(&mut out, runbook, steps, 0);

    if target.is_release() && !runbook.restore_steps().is_empty() {
        let _ = writeln!(out, "On failure:");
        append(&mut out, runbook, runbook.restore_steps(), steps.len());
    }
    out
}

fn append(out: &mut String, runbook: &Runbook, names: &[String], start: usize) {
    for (offset, name) in names.iter().enumerate() {
        let kind = runbook
            .get_step(name)
            .map(|def| def.category().as_str())
            .unwrap_or("unknown");
        let _ = writeln!(out, "[{}] {} ({})", start + offset, name, kind);
    }
}

#[cfg(test)]
#[path = "steps_tests.rs"]
mod tests;
