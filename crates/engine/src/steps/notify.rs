// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build announcement step

use super::render;
use crate::error::StepError;
use crate::step::{Step, StepContext};
use async_trait::async_trait;
use mf_adapters::NotifyAdapter;
use mf_runbook::{StepDef, StepKind};
use std::path::PathBuf;

pub const DEFAULT_NOTIFY_CHANNEL: &str = "builds";

/// Sends a templated message; a delivery failure only warns
pub struct NotifyStep<N> {
    def: StepDef,
    notify: N,
    runbook_dir: PathBuf,
}

impl<N: NotifyAdapter> NotifyStep<N> {
    pub fn new(def: StepDef, notify: N, runbook_dir: impl Into<PathBuf>) -> Self {
        Self {
            def,
            notify,
            runbook_dir: runbook_dir.into(),
        }
    }
}

#[async_trait]
impl<N: NotifyAdapter> Step for NotifyStep<N> {
    fn name(&self) -> &str {
        &self.def.name
    }

    fn category(&self) -> StepKind {
        self.def.category()
    }

    async fn process(&mut self, ctx: &mut StepContext<'_>) -> Result<(), StepError> {
        let channel = self
            .def
            .channel
            .as_deref()
            .map(|c| render(c, ctx, &self.runbook_dir))
            .unwrap_or_else(|| DEFAULT_NOTIFY_CHANNEL.to_string());
        let message = render(
            self.def.message.as_deref().unwrap_or_default(),
            ctx,
            &self.runbook_dir,
        );

        match self.notify.send(&channel, &message).await {
            Ok(()) => ctx.log(format!("Sent to {}: {}", channel, message)),
            Err(e) => ctx.warning(format!("Notification to {} failed: {}", channel, e)),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
