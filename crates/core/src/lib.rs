// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! mf-core: data model for the modpack build orchestrator
//!
//! This crate provides:
//! - Builds, build steps and their status vocabularies
//! - Partial build updates handed to the persistence layer
//! - A clock abstraction so timestamps are testable

pub mod build;
pub mod clock;
pub mod step;

pub use build::{Build, BuildId, BuildStatus, BuildTarget, BuildUpdate, Environment, ParseTargetError};
pub use clock::{Clock, FakeClock, SystemClock};
pub use step::{colour, BuildStep, StepLogEntry, StepStatus};
