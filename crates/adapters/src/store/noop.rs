// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op build store for runs that need no persistence.

use super::{BuildStore, StoreError};
use async_trait::async_trait;
use mf_core::{BuildId, BuildStep, BuildUpdate};

/// Build store that discards every update.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpBuildStore;

impl NoOpBuildStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BuildStore for NoOpBuildStore {
    async fn build_updated(
        &self,
        _build_id: &BuildId,
        _update: BuildUpdate,
    ) -> Result<(), StoreError> {
        Ok(())
    }

    async fn step_updated(&self, _build_id: &BuildId, _step: &BuildStep) -> Result<(), StoreError> {
        Ok(())
    }
}
