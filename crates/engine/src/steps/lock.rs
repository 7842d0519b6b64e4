// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Release lock file steps

use super::render_path;
use crate::error::StepError;
use crate::step::{Step, StepContext};
use async_trait::async_trait;
use mf_runbook::{StepDef, StepKind};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Creates the lock file; fails if another release holds it
pub struct LockStep {
    def: StepDef,
    runbook_dir: PathBuf,
}

impl LockStep {
    pub fn new(def: StepDef, runbook_dir: impl Into<PathBuf>) -> Self {
        Self {
            def,
            runbook_dir: runbook_dir.into(),
        }
    }
}

#[async_trait]
impl Step for LockStep {
    fn name(&self) -> &str {
        &self.def.name
    }

    fn category(&self) -> StepKind {
        self.def.category()
    }

    async fn process(&mut self, ctx: &mut StepContext<'_>) -> Result<(), StepError> {
        let path = lock_path(&self.def, ctx, &self.runbook_dir)?;
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                let holder = tokio::fs::read_to_string(&path).await.unwrap_or_default();
                return Err(StepError::Failed(format!(
                    "lock {} is held by build {}",
                    path.display(),
                    holder.trim()
                )));
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(format!("{}\n", ctx.build_id()).as_bytes()).await?;
        file.flush().await?;
        ctx.log(format!("Locked {}", path.display()));
        Ok(())
    }
}

/// Removes the lock file; skipped unless this build holds it
pub struct UnlockStep {
    def: StepDef,
    runbook_dir: PathBuf,
}

impl UnlockStep {
    pub fn new(def: StepDef, runbook_dir: impl Into<PathBuf>) -> Self {
        Self {
            def,
            runbook_dir: runbook_dir.into(),
        }
    }
}

#[async_trait]
impl Step for UnlockStep {
    fn name(&self) -> &str {
        &self.def.name
    }

    fn category(&self) -> StepKind {
        self.def.category()
    }

    async fn check_guards(&mut self, ctx: &StepContext<'_>) -> bool {
        let Ok(path) = lock_path(&self.def, ctx, &self.runbook_dir) else {
            return false;
        };
        match tokio::fs::read_to_string(&path).await {
            Ok(holder) => holder.trim() == ctx.build_id().as_str(),
            Err(_) => false,
        }
    }

    async fn process(&mut self, ctx: &mut StepContext<'_>) -> Result<(), StepError> {
        let path = lock_path(&self.def, ctx, &self.runbook_dir)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            // Removed since the guard ran
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        ctx.log(format!("Unlocked {}", path.display()));
        Ok(())
    }
}

fn lock_path(
    def: &StepDef,
    ctx: &StepContext<'_>,
    runbook_dir: &std::path::Path,
) -> Result<PathBuf, StepError> {
    let template = def
        .lock_file
        .as_deref()
        .ok_or_else(|| StepError::Failed(format!("step {} has no lock_file", def.name)))?;
    Ok(render_path(template, ctx, runbook_dir))
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
