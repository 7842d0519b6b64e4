// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build persistence adapters
//!
//! The build core never owns storage. It pushes incremental build updates
//! and step snapshots through a [`BuildStore`] and moves on.

mod json;
mod noop;

pub use json::{BuildRecord, JsonBuildStore};
pub use noop::NoOpBuildStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeBuildStore, StoreCall};

use async_trait::async_trait;
use mf_core::{BuildId, BuildStep, BuildUpdate};
use thiserror::Error;

/// Errors from persistence operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("build not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistence callbacks for build progress.
///
/// Both methods may be called from background tasks, repeatedly, and
/// concurrently for unrelated builds.
#[async_trait]
pub trait BuildStore: Clone + Send + Sync + 'static {
    /// Apply an incremental update to a build's stored representation
    async fn build_updated(&self, build_id: &BuildId, update: BuildUpdate)
        -> Result<(), StoreError>;

    /// Re-persist the current snapshot of one step
    async fn step_updated(&self, build_id: &BuildId, step: &BuildStep) -> Result<(), StoreError>;
}
