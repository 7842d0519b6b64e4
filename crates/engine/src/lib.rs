// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Modpack build engine: queue, processor, step lifecycle and process runner

mod error;
mod error_filter;
pub mod process;
mod processor;
mod queue;
mod registry;
pub mod step;
pub mod steps;

pub use error::{ProcessError, ProcessorError, RegistryError, StepError};
pub use error_filter::ErrorFilter;
pub use process::{
    OutputKind, ProcessCommand, ProcessIdSet, ProcessOutputLine, ProcessTracker,
};
pub use processor::BuildProcessor;
pub use queue::BuildQueue;
pub use registry::StepRegistry;
pub use step::{run_step, Step, StepContext, StepSink};
pub use steps::StepDeps;
