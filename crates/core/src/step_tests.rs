// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn new_step_is_pending_and_idle() {
    let step = BuildStep::new("pull", 0);
    assert_eq!(step.status, StepStatus::Pending);
    assert!(!step.running);
    assert!(!step.finished);
    assert!(step.log.is_empty());
}

#[test]
fn warning_survives_plain_success() {
    let mut step = BuildStep::new("build", 1);
    step.record_outcome(StepStatus::Warning);
    step.record_outcome(StepStatus::Succeeded);
    assert_eq!(step.status, StepStatus::Warning);
}

#[parameterized(
    failed = { StepStatus::Failed },
    cancelled = { StepStatus::Cancelled },
    skipped = { StepStatus::Skipped },
)]
fn warning_is_replaced_by_non_success(outcome: StepStatus) {
    let mut step = BuildStep::new("build", 1);
    step.record_outcome(StepStatus::Warning);
    step.record_outcome(outcome);
    assert_eq!(step.status, outcome);
}

#[test]
fn start_and_stop_toggle_flags() {
    let now = chrono::Utc::now();
    let mut step = BuildStep::new("deploy", 2);

    step.mark_started(now);
    assert!(step.running);
    assert!(!step.finished);
    assert_eq!(step.started_at, Some(now));

    step.mark_stopped(now);
    assert!(!step.running);
    assert!(step.finished);
    assert_eq!(step.finished_at, Some(now));
}

#[test]
fn status_serializes_snake_case() {
    let json = serde_json::to_string(&StepStatus::Cancelled).unwrap();
    assert_eq!(json, "\"cancelled\"");
    assert_eq!(StepStatus::Skipped.to_string(), "skipped");
}
