// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake build store for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{BuildStore, StoreError};
use async_trait::async_trait;
use mf_core::{BuildId, BuildStatus, BuildStep, BuildUpdate};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Recorded store call
#[derive(Debug, Clone)]
pub enum StoreCall {
    Build {
        build_id: BuildId,
        update: BuildUpdate,
    },
    Step {
        build_id: BuildId,
        step: BuildStep,
    },
}

/// Fake build store that records every call
#[derive(Clone, Default)]
pub struct FakeBuildStore {
    calls: Arc<Mutex<Vec<StoreCall>>>,
    failing: Arc<AtomicBool>,
}

impl FakeBuildStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with an io error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Every step snapshot persisted for the named step, in order
    pub fn step_snapshots(&self, name: &str) -> Vec<BuildStep> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Step { step, .. } if step.name == name => Some(step),
                _ => None,
            })
            .collect()
    }

    /// Every build status persisted for `build_id`, in order
    pub fn statuses(&self, build_id: &BuildId) -> Vec<BuildStatus> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Build {
                    build_id: id,
                    update: BuildUpdate::Status { status, .. },
                } if &id == build_id => Some(status),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: StoreCall) -> Result<(), StoreError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("fake store failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl BuildStore for FakeBuildStore {
    async fn build_updated(
        &self,
        build_id: &BuildId,
        update: BuildUpdate,
    ) -> Result<(), StoreError> {
        self.record(StoreCall::Build {
            build_id: build_id.clone(),
            update,
        })
    }

    async fn step_updated(&self, build_id: &BuildId, step: &BuildStep) -> Result<(), StoreError> {
        self.record(StoreCall::Step {
            build_id: build_id.clone(),
            step: step.clone(),
        })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
