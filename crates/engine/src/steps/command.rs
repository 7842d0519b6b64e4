// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step running an external command through the process engine

use super::{render, render_path};
use crate::error::{ProcessError, StepError};
use crate::error_filter::ErrorFilter;
use crate::process::{OutputKind, ProcessCommand, ProcessOutputLine, ProcessTracker};
use crate::step::{Step, StepContext};
use async_trait::async_trait;
use futures::StreamExt;
use mf_core::colour;
use mf_runbook::{RunDirective, StepDef, StepKind};
use std::path::PathBuf;
use std::sync::Arc;

/// Runs `[step.<name>]` as an external command
///
/// Stdout lines land in the step log. Stderr lines pass through the step's
/// error filter; any that survive are logged in the error colour and, with
/// `fail_on_stderr`, fail the step once the process completes. A timeout,
/// spawn failure or non-zero exit code fails the step.
pub struct CommandStep {
    def: StepDef,
    runbook_dir: PathBuf,
    tracker: Option<Arc<dyn ProcessTracker>>,
    filter: ErrorFilter,
}

impl CommandStep {
    pub fn new(def: StepDef, runbook_dir: impl Into<PathBuf>) -> Self {
        let filter = ErrorFilter::for_step(&def);
        Self {
            def,
            runbook_dir: runbook_dir.into(),
            tracker: None,
            filter,
        }
    }

    pub fn with_tracker(mut self, tracker: Option<Arc<dyn ProcessTracker>>) -> Self {
        self.tracker = tracker;
        self
    }

    fn command(&self, ctx: &StepContext<'_>) -> Result<ProcessCommand, StepError> {
        let RunDirective::Command(executable) = &self.def.run else {
            return Err(StepError::Failed(format!(
                "step {} does not run a command",
                self.def.name
            )));
        };

        let cwd = match &self.def.cwd {
            Some(cwd) => render_path(cwd, ctx, &self.runbook_dir),
            None => self.runbook_dir.clone(),
        };
        let mut command = ProcessCommand::new(render(executable, ctx, &self.runbook_dir))
            .cwd(cwd)
            .arg_string(&render(&self.def.args, ctx, &self.runbook_dir))
            .timeout(self.def.timeout)
            .diagnostics(self.def.diagnostics)
            .envs(ctx.environment().clone())
            .env("MF_BUILD_ID", ctx.build_id().to_string())
            .env("MF_BUILD_TARGET", ctx.target().to_string())
            .env("MF_BUILD_VERSION", ctx.version());
        if let Some(tracker) = &self.tracker {
            command = command.tracker(tracker.clone());
        }
        Ok(command)
    }
}

#[async_trait]
impl Step for CommandStep {
    fn name(&self) -> &str {
        &self.def.name
    }

    fn category(&self) -> StepKind {
        self.def.category()
    }

    async fn check_guards(&mut self, ctx: &StepContext<'_>) -> bool {
        for var in &self.def.requires {
            match ctx.get_env(var) {
                Some(value) if !value.is_empty() => {}
                _ => {
                    ctx.log_coloured(format!("{} is not set", var), colour::SKIPPED);
                    return false;
                }
            }
        }
        true
    }

    async fn setup(&mut self, _ctx: &mut StepContext<'_>) -> Result<(), StepError> {
        self.filter.reset();
        Ok(())
    }

    async fn process(&mut self, ctx: &mut StepContext<'_>) -> Result<(), StepError> {
        let command = self.command(ctx)?;
        let program = command.program().display().to_string();
        ctx.log_coloured(
            format!("$ {} {}", program, command.args().join(" ")).trim_end().to_string(),
            colour::INFO,
        );

        let mut lines = command.execute(ctx.cancellation().clone());
        let mut last_plain = None;
        let mut error_lines = 0usize;

        while let Some(line) = lines.next().await {
            let ProcessOutputLine {
                content,
                kind,
                colour: line_colour,
                structured,
                exit_code,
                error,
            } = line;

            match kind {
                OutputKind::Output if structured => {
                    ctx.log_coloured(content, line_colour.unwrap_or_default());
                }
                OutputKind::Output => {
                    ctx.log(content.clone());
                    last_plain = Some(content);
                }
                OutputKind::Error => match error {
                    Some(ProcessError::Stderr(_)) | None => {
                        if !self.filter.should_ignore_error(&content) {
                            error_lines += 1;
                            ctx.log_coloured(content, colour::ERROR);
                        }
                    }
                    Some(fault) => return Err(fault.into()),
                },
                OutputKind::Completed => match exit_code {
                    Some(0) => {}
                    Some(code) => {
                        return Err(StepError::Failed(format!(
                            "{} exited with code {}",
                            program, code
                        )))
                    }
                    None => {
                        return Err(StepError::Failed(format!(
                            "{} was terminated by a signal",
                            program
                        )))
                    }
                },
                OutputKind::Cancelled => return Err(StepError::Cancelled),
            }
        }

        if error_lines > 0 && self.def.fail_on_stderr {
            return Err(StepError::Failed(format!(
                "{} reported {} error line(s)",
                program, error_lines
            )));
        }

        if let (Some(var), Some(value)) = (&self.def.capture, last_plain) {
            ctx.set_env(var.clone(), value).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
