// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-build state machine and restore cascade

use crate::error::ProcessorError;
use crate::registry::StepRegistry;
use crate::step::{run_step, StepContext, StepSink, DEFAULT_PROGRESS_INTERVAL};
use chrono::{DateTime, Utc};
use mf_adapters::BuildStore;
use mf_core::{
    colour, Build, BuildId, BuildStatus, BuildUpdate, Clock, StepLogEntry, StepStatus, SystemClock,
};
use mf_runbook::StepKind;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

type Now = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// How the main step sequence ended
enum Stopped {
    Completed,
    Failed { index: usize, kind: StepKind },
    Cancelled { index: usize, kind: StepKind },
}

/// Drives one build through its resolved steps
#[derive(Clone)]
pub struct BuildProcessor {
    registry: Arc<StepRegistry>,
    sink: Arc<dyn StepSink>,
    now: Now,
    progress_interval: Duration,
}

impl BuildProcessor {
    pub fn new<S: BuildStore>(registry: Arc<StepRegistry>, store: S) -> Self {
        let clock = SystemClock;
        Self {
            registry,
            sink: Arc::new(store),
            now: Arc::new(move || clock.now()),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_clock<C: Clock>(mut self, clock: C) -> Self {
        self.now = Arc::new(move || clock.now());
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Queue-facing entry point; never returns an error
    ///
    /// Anything that aborts the build outside a step marks it failed.
    pub async fn process_build_with_error_handling(
        &self,
        mut build: Build,
        cancel: CancellationToken,
    ) -> Build {
        let span = tracing::info_span!("build", build_id = %build.id, target = %build.target);

        let start = std::time::Instant::now();
        let result = self
            .process_build(&mut build, &cancel)
            .instrument(span.clone())
            .await;

        match result {
            Ok(()) => span.in_scope(|| {
                tracing::info!(
                    status = %build.status,
                    steps = build.steps.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "build finished"
                )
            }),
            Err(e) => {
                span.in_scope(|| tracing::error!(error = %e, "build aborted"));
                build.status = BuildStatus::Failed;
                build.finished_at = Some((self.now)());
                self.record_failure(&build.id).instrument(span).await;
            }
        }
        build
    }

    /// Persist a failed status for a build that could not finish normally
    pub async fn record_failure(&self, build_id: &BuildId) {
        let update = BuildUpdate::Status {
            status: BuildStatus::Failed,
            at: (self.now)(),
        };
        if let Err(e) = self.sink.build_updated(build_id, update).await {
            tracing::error!(build_id = %build_id, error = %e, "failed to record build failure");
        }
    }

    async fn process_build(
        &self,
        build: &mut Build,
        cancel: &CancellationToken,
    ) -> Result<(), ProcessorError> {
        self.set_status(build, BuildStatus::Running).await?;

        build.steps = self.registry.resolve(build.target)?;
        self.sink
            .build_updated(
                &build.id,
                BuildUpdate::StepsResolved {
                    steps: build.steps.clone(),
                },
            )
            .await?;

        let stopped = self.run_steps(build, cancel).await;

        let status = match stopped {
            Stopped::Completed => build.aggregate_status(),
            Stopped::Failed { index, kind } => {
                self.restore(build, index, kind).await;
                BuildStatus::Failed
            }
            Stopped::Cancelled { index, kind } => {
                self.restore(build, index, kind).await;
                BuildStatus::Cancelled
            }
        };
        self.set_status(build, status).await
    }

    async fn run_steps(&self, build: &mut Build, cancel: &CancellationToken) -> Stopped {
        for index in 0..build.steps.len() {
            let step = match self.registry.create(&build.steps[index].name) {
                Ok(step) => step,
                Err(e) => {
                    self.fail_uncreated(build, index, &e.to_string()).await;
                    return Stopped::Failed {
                        index,
                        kind: StepKind::Work,
                    };
                }
            };
            let kind = step.category();

            if cancel.is_cancelled() {
                let mut ctx = self.context(build, index, cancel.clone());
                ctx.cancel().await;
                return Stopped::Cancelled { index, kind };
            }

            match self.drive(step, build, index, cancel.clone()).await {
                StepStatus::Failed => return Stopped::Failed { index, kind },
                StepStatus::Cancelled => return Stopped::Cancelled { index, kind },
                _ => {}
            }
        }
        Stopped::Completed
    }

    /// Replace the unrun steps with the restore steps and run them
    ///
    /// Only release builds restore, and never after a failed backup or
    /// cleanup step. Restore step failures are logged and skipped past.
    async fn restore(&self, build: &mut Build, stopped_at: usize, stopped_kind: StepKind) {
        if !build.target.is_release() || stopped_kind.is_restorative() {
            return;
        }

        let start = stopped_at + 1;
        let steps = match self.registry.resolve_restore(start) {
            Ok(steps) => steps,
            Err(e) => {
                tracing::error!(error = %e, "restore steps could not be resolved");
                return;
            }
        };
        if steps.is_empty() {
            return;
        }

        tracing::warn!(restore_steps = steps.len(), "running restore cascade");
        build.steps.truncate(start);
        build.steps.extend(steps);
        let update = BuildUpdate::StepsResolved {
            steps: build.steps.clone(),
        };
        if let Err(e) = self.sink.build_updated(&build.id, update).await {
            tracing::warn!(error = %e, "failed to persist restore steps");
        }

        // Restoration must run even when the build itself was cancelled
        let cancel = CancellationToken::new();
        for index in start..build.steps.len() {
            let step = match self.registry.create(&build.steps[index].name) {
                Ok(step) => step,
                Err(e) => {
                    self.fail_uncreated(build, index, &e.to_string()).await;
                    continue;
                }
            };
            let status = self.drive(step, build, index, cancel.clone()).await;
            if status == StepStatus::Failed {
                tracing::warn!(step = %build.steps[index].name, "restore step failed, continuing");
            }
        }
    }

    async fn drive(
        &self,
        mut step: Box<dyn crate::step::Step>,
        build: &mut Build,
        index: usize,
        cancel: CancellationToken,
    ) -> StepStatus {
        let mut ctx = self.context(build, index, cancel);
        run_step(step.as_mut(), &mut ctx).await
    }

    fn context<'a>(
        &self,
        build: &'a mut Build,
        index: usize,
        cancel: CancellationToken,
    ) -> StepContext<'a> {
        let now = self.now.clone();
        StepContext::new(build, index, cancel)
            .with_sink(self.sink.clone())
            .with_clock(FnClock(now))
            .with_progress_interval(self.progress_interval)
    }

    async fn fail_uncreated(&self, build: &mut Build, index: usize, reason: &str) {
        tracing::error!(index, reason, "step could not be created");
        let at = (self.now)();
        let Some(step) = build.steps.get_mut(index) else {
            return;
        };
        step.push_log(StepLogEntry::new(reason, colour::ERROR));
        step.record_outcome(StepStatus::Failed);
        step.mark_stopped(at);
        if let Err(e) = self.sink.step_updated(&build.id, step).await {
            tracing::warn!(error = %e, "failed to persist step");
        }
    }

    async fn set_status(&self, build: &mut Build, status: BuildStatus) -> Result<(), ProcessorError> {
        let at = (self.now)();
        build.status = status;
        if status == BuildStatus::Running {
            build.started_at = Some(at);
        }
        if status.is_terminal() {
            build.finished_at = Some(at);
        }
        self.sink
            .build_updated(&build.id, BuildUpdate::Status { status, at })
            .await?;
        Ok(())
    }
}

/// Adapts the processor's erased clock for step contexts
#[derive(Clone)]
struct FnClock(Now);

impl Clock for FnClock {
    fn now(&self) -> DateTime<Utc> {
        (self.0)()
    }
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
