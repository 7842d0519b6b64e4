// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Build runbook parsing and definitions
//!
//! A runbook is a TOML file naming the ordered steps for each build target
//! and describing how each named step runs.

mod parser;
mod settings;
mod step;
mod template;

pub use parser::{load_runbook, parse_runbook, ParseError, Runbook, DEFAULT_RUNBOOK_FILE};
pub use settings::{GuardSettings, ProgressSettings, QueueSettings, TargetLists};
pub use step::{BuiltinStep, IgnoreBlock, RunDirective, StepDef, StepKind, DEFAULT_STEP_TIMEOUT};
pub use template::{interpolate, split_args};
