// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the build engine

use mf_adapters::{NotifyError, StoreError};
use std::time::Duration;
use thiserror::Error;

/// Faults reported by the process engine as `Error` output lines
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error("failed to start {program}: {message}")]
    Spawn { program: String, message: String },
    #[error("{0}")]
    Stderr(String),
    #[error("process timed out after {0:?}")]
    Timeout(Duration),
    #[error("failed to wait for process: {0}")]
    Wait(String),
}

/// Errors raised from a step's setup or process phase
#[derive(Debug, Error)]
pub enum StepError {
    #[error("{0}")]
    Failed(String),
    #[error("cancelled")]
    Cancelled,
    #[error("process error: {0}")]
    Process(#[from] ProcessError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl StepError {
    /// Cancellation takes the Cancel transition instead of Fail
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StepError::Cancelled)
    }
}

/// Errors from step lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no step registered under name: {0}")]
    UnknownStep(String),
}

/// Errors that abort a build outside any single step
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
