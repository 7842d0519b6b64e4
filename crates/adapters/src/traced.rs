// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::guard::{GuardError, ResourceGuard};
use crate::store::{BuildStore, StoreError};
use async_trait::async_trait;
use mf_core::{BuildId, BuildStep, BuildTarget, BuildUpdate};
use tracing::Instrument;

/// Wrapper that adds tracing to any BuildStore
#[derive(Clone)]
pub struct TracedBuildStore<S> {
    inner: S,
}

impl<S> TracedBuildStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: BuildStore> BuildStore for TracedBuildStore<S> {
    async fn build_updated(
        &self,
        build_id: &BuildId,
        update: BuildUpdate,
    ) -> Result<(), StoreError> {
        let span = tracing::debug_span!("store.build", build_id = %build_id, field = update.name());

        let start = std::time::Instant::now();
        let result = self
            .inner
            .build_updated(build_id, update)
            .instrument(span.clone())
            .await;
        let elapsed = start.elapsed();
        let _guard = span.enter();

        match &result {
            Ok(()) => tracing::trace!(elapsed_ms = elapsed.as_millis() as u64, "build persisted"),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "build update failed"
            ),
        }

        result
    }

    async fn step_updated(&self, build_id: &BuildId, step: &BuildStep) -> Result<(), StoreError> {
        let span = tracing::debug_span!(
            "store.step",
            build_id = %build_id,
            step = %step.name,
            index = step.index
        );

        let result = self
            .inner
            .step_updated(build_id, step)
            .instrument(span.clone())
            .await;
        let _guard = span.enter();
        match &result {
            Ok(()) => tracing::trace!(log_len = step.log.len(), "step persisted"),
            Err(e) => tracing::error!(error = %e, "step update failed"),
        }

        result
    }
}

/// Wrapper that adds tracing to any ResourceGuard
#[derive(Clone)]
pub struct TracedResourceGuard<G> {
    inner: G,
}

impl<G> TracedResourceGuard<G> {
    pub fn new(inner: G) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<G: ResourceGuard> ResourceGuard for TracedResourceGuard<G> {
    async fn is_busy(&self, target: BuildTarget) -> Result<bool, GuardError> {
        let span = tracing::info_span!("guard.is_busy", target = %target);

        let result = self.inner.is_busy(target).instrument(span.clone()).await;
        let _guard = span.enter();
        match &result {
            Ok(true) => tracing::info!("resource busy"),
            Ok(false) => tracing::debug!("resource free"),
            Err(e) => tracing::warn!(error = %e, "guard query failed"),
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
