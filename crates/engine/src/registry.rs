// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Name to step factory table and per-target step resolution

use crate::error::RegistryError;
use crate::step::Step;
use crate::steps::{CommandStep, LockStep, NotifyStep, StepDeps, UnlockStep};
use mf_adapters::NotifyAdapter;
use mf_core::{BuildStep, BuildTarget};
use mf_runbook::{BuiltinStep, Runbook, TargetLists};
use std::collections::HashMap;
use std::sync::Arc;

type StepFactory = Arc<dyn Fn() -> Box<dyn Step> + Send + Sync>;

/// Registered step kinds plus the ordered step lists for each target
#[derive(Clone, Default)]
pub struct StepRegistry {
    factories: HashMap<String, StepFactory>,
    targets: TargetLists,
}

impl StepRegistry {
    pub fn new(targets: TargetLists) -> Self {
        Self {
            factories: HashMap::new(),
            targets,
        }
    }

    /// Register every `[step.*]` of a runbook
    pub fn from_runbook<N: NotifyAdapter>(runbook: &Runbook, deps: StepDeps<N>) -> Self {
        let mut registry = Self::new(runbook.targets.clone());
        for (name, def) in &runbook.steps {
            let def = def.clone();
            let deps = deps.clone();
            match def.run.builtin() {
                None => registry.register(name, move || {
                    Box::new(
                        CommandStep::new(def.clone(), &deps.runbook_dir)
                            .with_tracker(deps.tracker.clone()),
                    )
                }),
                Some(BuiltinStep::Lock) => registry.register(name, move || {
                    Box::new(LockStep::new(def.clone(), &deps.runbook_dir))
                }),
                Some(BuiltinStep::Unlock) => registry.register(name, move || {
                    Box::new(UnlockStep::new(def.clone(), &deps.runbook_dir))
                }),
                Some(BuiltinStep::Notify) => registry.register(name, move || {
                    Box::new(NotifyStep::new(
                        def.clone(),
                        deps.notify.clone(),
                        &deps.runbook_dir,
                    ))
                }),
            }
        }
        registry
    }

    /// Register a step factory, replacing any previous one under `name`
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Step> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Step>, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::UnknownStep(name.to_string()))?;
        Ok(factory())
    }

    /// Ordered step records for a target, indexed from 0
    pub fn resolve(&self, target: BuildTarget) -> Result<Vec<BuildStep>, RegistryError> {
        self.records(self.targets.for_target(target), 0)
    }

    /// Restore step records, indexed from `start_index`
    pub fn resolve_restore(&self, start_index: usize) -> Result<Vec<BuildStep>, RegistryError> {
        self.records(&self.targets.restore, start_index)
    }

    fn records(&self, names: &[String], start: usize) -> Result<Vec<BuildStep>, RegistryError> {
        names
            .iter()
            .enumerate()
            .map(|(offset, name)| {
                if !self.contains(name) {
                    return Err(RegistryError::UnknownStep(name.clone()));
                }
                Ok(BuildStep::new(name.clone(), start + offset))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
