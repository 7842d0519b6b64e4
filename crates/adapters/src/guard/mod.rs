// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared-resource guards
//!
//! A guard answers one question before a build starts: is something
//! outside the orchestrator (live game servers on the same deployment
//! target, for instance) currently using the resource builds mutate?

mod noop;
mod pattern;

pub use noop::NoOpResourceGuard;
pub use pattern::ProcessPatternGuard;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeResourceGuard;

use async_trait::async_trait;
use mf_core::BuildTarget;
use thiserror::Error;

/// Errors from resource guard queries
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Adapter reporting whether a conflicting external resource is active
#[async_trait]
pub trait ResourceGuard: Clone + Send + Sync + 'static {
    /// Whether the resource used by builds for `target` is currently busy
    async fn is_busy(&self, target: BuildTarget) -> Result<bool, GuardError>;
}
