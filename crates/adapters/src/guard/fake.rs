// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake resource guard for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{GuardError, ResourceGuard};
use async_trait::async_trait;
use mf_core::BuildTarget;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Fake resource guard with a settable busy flag
#[derive(Clone, Default)]
pub struct FakeResourceGuard {
    busy: Arc<AtomicBool>,
    failing: Arc<AtomicBool>,
    queries: Arc<AtomicUsize>,
}

impl FakeResourceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard that starts out busy
    pub fn busy() -> Self {
        let guard = Self::default();
        guard.set_busy(true);
        guard
    }

    pub fn set_busy(&self, busy: bool) {
        self.busy.store(busy, Ordering::SeqCst);
    }

    /// Make queries return an error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of times the guard has been queried
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceGuard for FakeResourceGuard {
    async fn is_busy(&self, _target: BuildTarget) -> Result<bool, GuardError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(GuardError::CommandFailed("fake guard failure".to_string()));
        }
        Ok(self.busy.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
