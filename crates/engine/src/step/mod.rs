// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step lifecycle
//!
//! Every step runs Start, then CheckGuards, then either Skip or
//! Setup and Process followed by Succeed, Fail or Cancel.

mod context;
mod progress;

pub use context::{StepContext, StepSink};
pub use progress::{ProgressPusher, DEFAULT_PROGRESS_INTERVAL};

use crate::error::StepError;
use async_trait::async_trait;
use mf_core::StepStatus;
use mf_runbook::StepKind;

/// Step-specific behaviour driven by the lifecycle
#[async_trait]
pub trait Step: Send {
    fn name(&self) -> &str;

    /// Backup and cleanup steps do not trigger a restore when they fail
    fn category(&self) -> StepKind {
        StepKind::Work
    }

    /// Whether the step's work applies to this build
    async fn check_guards(&mut self, _ctx: &StepContext<'_>) -> bool {
        true
    }

    async fn setup(&mut self, _ctx: &mut StepContext<'_>) -> Result<(), StepError> {
        Ok(())
    }

    async fn process(&mut self, _ctx: &mut StepContext<'_>) -> Result<(), StepError> {
        Ok(())
    }
}

/// Drive one step through its lifecycle and return its final status
pub async fn run_step(step: &mut dyn Step, ctx: &mut StepContext<'_>) -> StepStatus {
    if ctx.start().is_err() {
        ctx.cancel().await;
        return ctx.status();
    }

    if !step.check_guards(ctx).await {
        ctx.skip().await;
        return ctx.status();
    }

    match run_phases(step, ctx).await {
        Ok(()) => ctx.succeed().await,
        Err(e) if e.is_cancelled() => ctx.cancel().await,
        Err(e) => ctx.fail(&e).await,
    }
    ctx.status()
}

async fn run_phases(step: &mut dyn Step, ctx: &mut StepContext<'_>) -> Result<(), StepError> {
    ctx.enter_section("Setup")?;
    step.setup(ctx).await?;
    ctx.enter_section("Process")?;
    step.process(ctx).await
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
