// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step kinds a runbook can name

mod command;
mod lock;
mod notify;

pub use command::CommandStep;
pub use lock::{LockStep, UnlockStep};
pub use notify::{NotifyStep, DEFAULT_NOTIFY_CHANNEL};

use crate::process::ProcessTracker;
use crate::step::StepContext;
use mf_runbook::interpolate;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Collaborators shared by every step a registry creates
#[derive(Clone)]
pub struct StepDeps<N> {
    pub notify: N,
    pub tracker: Option<Arc<dyn ProcessTracker>>,
    /// Relative paths in step definitions resolve against this directory
    pub runbook_dir: PathBuf,
}

impl<N> StepDeps<N> {
    pub fn new(notify: N, runbook_dir: impl Into<PathBuf>) -> Self {
        Self {
            notify,
            tracker: None,
            runbook_dir: runbook_dir.into(),
        }
    }

    pub fn with_tracker(mut self, tracker: Arc<dyn ProcessTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }
}

/// Interpolate a template with the build's variables plus `runbook_dir`
pub(crate) fn render(template: &str, ctx: &StepContext<'_>, runbook_dir: &Path) -> String {
    let mut vars = ctx.template_vars();
    vars.insert("runbook_dir".to_string(), runbook_dir.display().to_string());
    interpolate(template, &vars)
}

/// Render a path template, resolving it against the runbook directory
pub(crate) fn render_path(template: &str, ctx: &StepContext<'_>, runbook_dir: &Path) -> PathBuf {
    runbook_dir.join(render(template, ctx, runbook_dir))
}
