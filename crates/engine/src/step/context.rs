// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-step state and lifecycle transitions

use super::progress::{ProgressPusher, DEFAULT_PROGRESS_INTERVAL};
use crate::error::StepError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mf_adapters::{BuildStore, NoOpBuildStore, StoreError};
use mf_core::{
    colour, Build, BuildId, BuildStep, BuildTarget, BuildUpdate, Clock, Environment, StepLogEntry,
    StepStatus, SystemClock,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Object-safe persistence callbacks used while a step runs
///
/// Implemented for every [`BuildStore`].
#[async_trait]
pub trait StepSink: Send + Sync {
    async fn build_updated(&self, build_id: &BuildId, update: BuildUpdate)
        -> Result<(), StoreError>;
    async fn step_updated(&self, build_id: &BuildId, step: &BuildStep) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: BuildStore> StepSink for S {
    async fn build_updated(
        &self,
        build_id: &BuildId,
        update: BuildUpdate,
    ) -> Result<(), StoreError> {
        BuildStore::build_updated(self, build_id, update).await
    }

    async fn step_updated(&self, build_id: &BuildId, step: &BuildStep) -> Result<(), StoreError> {
        BuildStore::step_updated(self, build_id, step).await
    }
}

type Now = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Lifecycle state for the step at `index` of a build
///
/// The step record lives in a watch channel while the step runs so the
/// progress pusher only ever reads snapshots. The record is written back
/// into the build when the context is dropped.
pub struct StepContext<'a> {
    build: &'a mut Build,
    index: usize,
    record: watch::Sender<BuildStep>,
    sink: Arc<dyn StepSink>,
    now: Now,
    cancel: CancellationToken,
    progress_interval: Duration,
    pusher: Option<ProgressPusher>,
}

impl<'a> StepContext<'a> {
    pub fn new(build: &'a mut Build, index: usize, cancel: CancellationToken) -> Self {
        let record = build
            .steps
            .get(index)
            .cloned()
            .unwrap_or_else(|| BuildStep::new(String::new(), index));
        let clock = SystemClock;
        Self {
            build,
            index,
            record: watch::Sender::new(record),
            sink: Arc::new(NoOpBuildStore),
            now: Arc::new(move || clock.now()),
            cancel,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            pusher: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn StepSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_store<S: BuildStore>(self, store: S) -> Self {
        self.with_sink(Arc::new(store))
    }

    pub fn with_clock<C: Clock>(mut self, clock: C) -> Self {
        self.now = Arc::new(move || clock.now());
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn build_id(&self) -> &BuildId {
        &self.build.id
    }

    pub fn target(&self) -> BuildTarget {
        self.build.target
    }

    pub fn version(&self) -> &str {
        &self.build.version
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn step_name(&self) -> String {
        self.record.borrow().name.clone()
    }

    /// Current copy of the step record
    pub fn snapshot(&self) -> BuildStep {
        self.record.borrow().clone()
    }

    pub fn status(&self) -> StepStatus {
        self.record.borrow().status
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn check_cancelled(&self) -> Result<(), StepError> {
        if self.cancel.is_cancelled() {
            return Err(StepError::Cancelled);
        }
        Ok(())
    }

    pub fn log(&self, text: impl Into<String>) {
        self.push(StepLogEntry::plain(text));
    }

    pub fn log_coloured(&self, text: impl Into<String>, colour: impl Into<String>) {
        self.push(StepLogEntry::new(text, colour));
    }

    /// Downgrade the step's eventual success to a warning without aborting
    pub fn warning(&self, message: impl Into<String>) {
        let entry = StepLogEntry::new(message, colour::WARNING);
        self.record.send_modify(|step| {
            step.push_log(entry);
            step.record_outcome(StepStatus::Warning);
        });
    }

    pub fn environment(&self) -> &Environment {
        &self.build.environment
    }

    pub fn get_env(&self, key: &str) -> Option<&str> {
        self.build.environment.get(key).map(String::as_str)
    }

    /// Set a build environment variable and persist the environment
    pub async fn set_env(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), StepError> {
        let key = key.into();
        self.build.environment.insert(key.clone(), value.into());
        tracing::debug!(build_id = %self.build.id, key = %key, "environment updated");
        let update = BuildUpdate::Environment {
            environment: self.build.environment.clone(),
        };
        self.sink.build_updated(&self.build.id, update).await?;
        Ok(())
    }

    /// Template variables: the build environment plus build metadata
    pub fn template_vars(&self) -> BTreeMap<String, String> {
        let mut vars = self.build.environment.clone();
        vars.insert("build_id".to_string(), self.build.id.to_string());
        vars.insert("target".to_string(), self.build.target.to_string());
        vars.insert("version".to_string(), self.build.version.clone());
        vars
    }

    /// Mark the step running and begin progress pushes
    pub fn start(&mut self) -> Result<(), StepError> {
        self.check_cancelled()?;

        // Subscribe first so the running state is part of the first push
        let snapshot = self.record.subscribe();
        let at = (self.now)();
        self.record.send_modify(|step| {
            step.mark_started(at);
            let text = format!("Starting {}", step.name);
            step.push_log(StepLogEntry::new(text, colour::INFO));
        });
        tracing::info!(
            build_id = %self.build.id,
            step = %self.step_name(),
            index = self.index,
            "step started"
        );

        self.pusher = Some(ProgressPusher::spawn(
            self.build.id.clone(),
            snapshot,
            self.sink.clone(),
            self.progress_interval,
        ));
        Ok(())
    }

    /// Re-check cancellation and log a section marker
    pub fn enter_section(&self, section: &str) -> Result<(), StepError> {
        self.check_cancelled()?;
        self.log_coloured(format!("== {} ==", section), colour::INFO);
        Ok(())
    }

    pub async fn succeed(&mut self) {
        let (text, entry_colour) = if self.status() == StepStatus::Warning {
            (format!("{} completed with warnings", self.step_name()), colour::WARNING)
        } else {
            (format!("{} succeeded", self.step_name()), colour::SUCCESS)
        };
        self.finish(StepStatus::Succeeded, StepLogEntry::new(text, entry_colour))
            .await;
    }

    pub async fn fail(&mut self, error: &StepError) {
        let text = format!("{} failed: {}", self.step_name(), error);
        tracing::warn!(
            build_id = %self.build.id,
            step = %self.step_name(),
            error = %error,
            "step failed"
        );
        self.finish(StepStatus::Failed, StepLogEntry::new(text, colour::ERROR))
            .await;
    }

    pub async fn cancel(&mut self) {
        let text = format!("{} cancelled", self.step_name());
        self.finish(StepStatus::Cancelled, StepLogEntry::new(text, colour::WARNING))
            .await;
    }

    pub async fn skip(&mut self) {
        let text = format!("{} skipped", self.step_name());
        self.finish(StepStatus::Skipped, StepLogEntry::new(text, colour::SKIPPED))
            .await;
    }

    fn push(&self, entry: StepLogEntry) {
        self.record.send_modify(|step| step.push_log(entry));
    }

    async fn finish(&mut self, outcome: StepStatus, entry: StepLogEntry) {
        // Joined before the final write so a push never lands after it
        if let Some(pusher) = self.pusher.take() {
            pusher.stop().await;
        }

        let at = (self.now)();
        self.record.send_modify(|step| {
            step.push_log(entry);
            step.record_outcome(outcome);
            step.mark_stopped(at);
        });

        let snapshot = self.snapshot();
        tracing::info!(
            build_id = %self.build.id,
            step = %snapshot.name,
            index = self.index,
            status = %snapshot.status,
            "step finished"
        );
        if let Err(e) = self.sink.step_updated(&self.build.id, &snapshot).await {
            tracing::warn!(build_id = %self.build.id, step = %snapshot.name, error = %e, "final step flush failed");
        }
        self.write_back();
    }

    fn write_back(&mut self) {
        let snapshot = self.record.borrow().clone();
        if let Some(slot) = self.build.steps.get_mut(self.index) {
            *slot = snapshot;
        }
    }
}

impl Drop for StepContext<'_> {
    fn drop(&mut self) {
        self.write_back();
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
