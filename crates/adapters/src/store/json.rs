// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON file build store
//!
//! Keeps one document per build in memory and rewrites
//! `<dir>/<build_id>.json` after every update.

use super::{BuildStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mf_core::{BuildId, BuildStatus, BuildStep, BuildUpdate, Environment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Persisted view of a build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildRecord {
    pub id: String,
    pub status: BuildStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub steps: Vec<BuildStep>,
}

impl BuildRecord {
    fn apply(&mut self, update: BuildUpdate) {
        match update {
            BuildUpdate::Status { status, at } => {
                if status == BuildStatus::Running {
                    self.started_at = Some(at);
                }
                if status.is_terminal() {
                    self.finished_at = Some(at);
                }
                self.status = status;
            }
            BuildUpdate::Environment { environment } => self.environment = environment,
            BuildUpdate::StepsResolved { steps } => self.steps = steps,
        }
    }

    fn apply_step(&mut self, step: &BuildStep) {
        match self.steps.iter_mut().find(|s| s.index == step.index) {
            Some(existing) => *existing = step.clone(),
            None => {
                self.steps.push(step.clone());
                self.steps.sort_by_key(|s| s.index);
            }
        }
    }
}

/// Build store backed by one JSON file per build
#[derive(Clone)]
pub struct JsonBuildStore {
    dir: PathBuf,
    records: Arc<Mutex<HashMap<BuildId, BuildRecord>>>,
}

impl JsonBuildStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            records: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, build_id: &BuildId) -> PathBuf {
        self.dir.join(format!("{}.json", build_id))
    }

    /// Read a stored build back from disk
    pub async fn load(&self, build_id: &BuildId) -> Result<BuildRecord, StoreError> {
        let path = self.path_for(build_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(build_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    async fn update<F>(&self, build_id: &BuildId, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut BuildRecord),
    {
        // Held across the write so snapshots land on disk in call order
        let mut records = self.records.lock().await;
        let record = records
            .entry(build_id.clone())
            .or_insert_with(|| BuildRecord {
                id: build_id.to_string(),
                ..BuildRecord::default()
            });
        f(record);
        let json = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(self.path_for(build_id), json).await?;
        Ok(())
    }
}

#[async_trait]
impl BuildStore for JsonBuildStore {
    async fn build_updated(
        &self,
        build_id: &BuildId,
        update: BuildUpdate,
    ) -> Result<(), StoreError> {
        self.update(build_id, |record| record.apply(update)).await
    }

    async fn step_updated(&self, build_id: &BuildId, step: &BuildStep) -> Result<(), StoreError> {
        self.update(build_id, |record| record.apply_step(step)).await
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
