// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Guard that never reports the resource as busy.

use super::{GuardError, ResourceGuard};
use async_trait::async_trait;
use mf_core::BuildTarget;

/// Resource guard for deployments without a shared physical resource.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpResourceGuard;

impl NoOpResourceGuard {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResourceGuard for NoOpResourceGuard {
    async fn is_busy(&self, _target: BuildTarget) -> Result<bool, GuardError> {
        Ok(false)
    }
}
