// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `mf run --target <t> --version <v>` - Run one build to completion

use super::{open_runbook, parse_key_val, state_dir};
use crate::output;
use anyhow::Result;
use clap::Args;
use mf_adapters::{
    DesktopNotifyAdapter, JsonBuildStore, NoOpResourceGuard, ProcessPatternGuard, ResourceGuard,
    StoreError, TracedBuildStore, TracedResourceGuard,
};
use mf_core::{Build, BuildId, BuildTarget};
use mf_engine::{BuildProcessor, BuildQueue, ProcessIdSet, StepDeps, StepRegistry};
use mf_runbook::QueueSettings;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args)]
pub struct RunArgs {
    /// Build target (development, release_candidate, release)
    #[arg(long, short)]
    pub target: BuildTarget,

    /// Version being built
    #[arg(long, short)]
    pub version: String,

    /// Initial build environment (KEY=VALUE)
    #[arg(long = "env", short = 'e', value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,

    /// Runbook path (default: ./mf.toml)
    #[arg(long)]
    pub runbook: Option<PathBuf>,

    /// Directory for build snapshots (default: <runbook dir>/.mf/builds)
    #[arg(long)]
    pub state_dir: Option<PathBuf>,
}

/// Returns whether the build ended succeeded or with warnings
pub async fn run(args: RunArgs) -> Result<bool> {
    let runbook = open_runbook(args.runbook.as_deref())?;
    let store = JsonBuildStore::open(state_dir(&runbook.dir, args.state_dir))?;
    let tracker = Arc::new(ProcessIdSet::new());

    let deps = StepDeps::new(DesktopNotifyAdapter::new(), runbook.dir.clone())
        .with_tracker(tracker.clone());
    let registry = Arc::new(StepRegistry::from_runbook(&runbook, deps));
    let processor = BuildProcessor::new(registry, TracedBuildStore::new(store.clone()))
        .with_progress_interval(runbook.progress.interval);

    let mut build = Build::new(BuildId::generate(), args.target, args.version);
    for (key, value) in args.env {
        build = build.with_env(key, value);
    }

    let settings = runbook.queue.clone();
    let id = match &runbook.guard.process_pattern {
        Some(pattern) => {
            let guard = TracedResourceGuard::new(ProcessPatternGuard::new(pattern.clone()));
            run_to_completion(processor, guard, settings, build).await
        }
        None => run_to_completion(processor, NoOpResourceGuard::new(), settings, build).await,
    };

    let leftover = tracker.pids();
    if !leftover.is_empty() {
        tracing::warn!(pids = ?leftover, "processes still running after build");
    }

    let record = match store.load(&id).await {
        Ok(record) => record,
        // Cancelled before it left the queue
        Err(StoreError::NotFound(_)) => {
            println!("Build {}: cancelled", id);
            return Ok(false);
        }
        Err(e) => return Err(e.into()),
    };
    println!("{}", output::summary(&record));
    Ok(record.status.is_success())
}

async fn run_to_completion<G: ResourceGuard>(
    processor: BuildProcessor,
    guard: G,
    settings: QueueSettings,
    build: Build,
) -> BuildId {
    let queue = BuildQueue::new(processor, guard, settings);
    let id = queue.enqueue(build);

    tokio::select! {
        _ = queue.wait_idle() => {}
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Cancelling build {}...", id);
            queue.cancel_all();
            queue.wait_idle().await;
        }
    }
    id
}
