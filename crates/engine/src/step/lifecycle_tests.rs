// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use mf_core::{Build, BuildId, BuildStep, BuildTarget};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy)]
enum Outcome {
    Ok,
    Fail,
    Cancel,
    Warn,
}

struct RecordingStep {
    calls: Arc<Mutex<Vec<&'static str>>>,
    guard: bool,
    setup: Outcome,
    process: Outcome,
}

impl RecordingStep {
    fn new(guard: bool, setup: Outcome, process: Outcome) -> (Self, Arc<Mutex<Vec<&'static str>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let step = Self {
            calls: calls.clone(),
            guard,
            setup,
            process,
        };
        (step, calls)
    }

    fn apply(&self, ctx: &StepContext<'_>, outcome: Outcome) -> Result<(), StepError> {
        match outcome {
            Outcome::Ok => Ok(()),
            Outcome::Fail => Err(StepError::Failed("boom".to_string())),
            Outcome::Cancel => Err(StepError::Cancelled),
            Outcome::Warn => {
                ctx.warning("careful");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Step for RecordingStep {
    fn name(&self) -> &str {
        "recording"
    }

    async fn check_guards(&mut self, _ctx: &StepContext<'_>) -> bool {
        self.calls.lock().unwrap().push("check_guards");
        self.guard
    }

    async fn setup(&mut self, ctx: &mut StepContext<'_>) -> Result<(), StepError> {
        self.calls.lock().unwrap().push("setup");
        self.apply(ctx, self.setup)
    }

    async fn process(&mut self, ctx: &mut StepContext<'_>) -> Result<(), StepError> {
        self.calls.lock().unwrap().push("process");
        self.apply(ctx, self.process)
    }
}

fn one_step_build() -> Build {
    let mut build = Build::new(BuildId::from("b-1"), BuildTarget::Development, "1.0");
    build.steps.push(BuildStep::new("recording", 0));
    build
}

async fn drive(
    step: &mut RecordingStep,
    cancel: CancellationToken,
) -> (StepStatus, BuildStep) {
    let mut build = one_step_build();
    let status = {
        let mut ctx = StepContext::new(&mut build, 0, cancel);
        run_step(step, &mut ctx).await
    };
    (status, build.steps.remove(0))
}

#[tokio::test]
async fn guard_false_skips_without_setup_or_process() {
    let (mut step, calls) = RecordingStep::new(false, Outcome::Ok, Outcome::Ok);
    let (status, record) = drive(&mut step, CancellationToken::new()).await;

    assert_eq!(status, StepStatus::Skipped);
    assert_eq!(*calls.lock().unwrap(), ["check_guards"]);
    assert!(record.finished);
}

#[tokio::test]
async fn success_runs_every_phase_in_order() {
    let (mut step, calls) = RecordingStep::new(true, Outcome::Ok, Outcome::Ok);
    let (status, record) = drive(&mut step, CancellationToken::new()).await;

    assert_eq!(status, StepStatus::Succeeded);
    assert_eq!(*calls.lock().unwrap(), ["check_guards", "setup", "process"]);
    let texts: Vec<_> = record.log.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(
        texts,
        [
            "Starting recording",
            "== Setup ==",
            "== Process ==",
            "recording succeeded"
        ]
    );
}

#[tokio::test]
async fn process_error_fails_step() {
    let (mut step, _calls) = RecordingStep::new(true, Outcome::Ok, Outcome::Fail);
    let (status, record) = drive(&mut step, CancellationToken::new()).await;

    assert_eq!(status, StepStatus::Failed);
    assert!(record.is_failed());
    assert!(!record.running);
}

#[tokio::test]
async fn setup_cancellation_skips_process() {
    let (mut step, calls) = RecordingStep::new(true, Outcome::Cancel, Outcome::Ok);
    let (status, _record) = drive(&mut step, CancellationToken::new()).await;

    assert_eq!(status, StepStatus::Cancelled);
    assert_eq!(*calls.lock().unwrap(), ["check_guards", "setup"]);
}

#[tokio::test]
async fn cancelled_before_start_runs_nothing() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let (mut step, calls) = RecordingStep::new(true, Outcome::Ok, Outcome::Ok);
    let (status, record) = drive(&mut step, cancel).await;

    assert_eq!(status, StepStatus::Cancelled);
    assert!(calls.lock().unwrap().is_empty());
    assert!(record.finished);
}

#[tokio::test]
async fn warning_in_process_ends_as_warning() {
    let (mut step, _calls) = RecordingStep::new(true, Outcome::Ok, Outcome::Warn);
    let (status, _record) = drive(&mut step, CancellationToken::new()).await;

    assert_eq!(status, StepStatus::Warning);
}
