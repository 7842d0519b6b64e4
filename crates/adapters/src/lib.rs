// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the collaborators around the build core: persistence,
//! the shared-resource guard, and notifications.

pub mod guard;
pub mod notify;
pub mod store;
pub mod traced;

pub use guard::{GuardError, NoOpResourceGuard, ProcessPatternGuard, ResourceGuard};
pub use notify::{DesktopNotifyAdapter, NoOpNotifyAdapter, NotifyAdapter, NotifyError};
pub use store::{BuildRecord, BuildStore, JsonBuildStore, NoOpBuildStore, StoreError};
pub use traced::{TracedBuildStore, TracedResourceGuard};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use guard::FakeResourceGuard;
#[cfg(any(test, feature = "test-support"))]
pub use notify::{FakeNotifyAdapter, NotifyCall};
#[cfg(any(test, feature = "test-support"))]
pub use store::{FakeBuildStore, StoreCall};
