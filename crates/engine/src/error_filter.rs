// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stateful filter deciding which error lines a step ignores

use mf_runbook::{IgnoreBlock, StepDef};

/// Suppresses error lines by exclusion substring or inside an ignore block
///
/// Rules are checked in order: empty text is ignored; the close marker ends
/// an ignore block and is itself ignored; every line inside a block is
/// ignored; the open marker starts a block and is ignored; otherwise a line
/// is ignored when it contains an exclusion (case-insensitive).
#[derive(Debug, Clone, Default)]
pub struct ErrorFilter {
    exclusions: Vec<String>,
    block: Option<IgnoreBlock>,
    ignoring: bool,
}

impl ErrorFilter {
    pub fn new(exclusions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            exclusions: exclusions
                .into_iter()
                .map(|e| e.into().to_lowercase())
                .collect(),
            block: None,
            ignoring: false,
        }
    }

    pub fn with_block(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.block = Some(IgnoreBlock {
            open: open.into(),
            close: close.into(),
        });
        self
    }

    /// Filter configured from a step's `ignore_errors` and `ignore_block`
    pub fn for_step(def: &StepDef) -> Self {
        let filter = Self::new(def.ignore_errors.iter().cloned());
        match &def.ignore_block {
            Some(block) => filter.with_block(block.open.clone(), block.close.clone()),
            None => filter,
        }
    }

    pub fn is_ignoring(&self) -> bool {
        self.ignoring
    }

    pub fn should_ignore_error(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return true;
        }

        if let Some(block) = &self.block {
            if !block.close.is_empty() && text.contains(&block.close) {
                self.ignoring = false;
                return true;
            }
            if self.ignoring {
                return true;
            }
            if !block.open.is_empty() && text.contains(&block.open) {
                self.ignoring = true;
                return true;
            }
        }

        let lowered = text.to_lowercase();
        self.exclusions.iter().any(|e| lowered.contains(e.as_str()))
    }

    /// Leave ignoring mode so the filter can be reused for another invocation
    pub fn reset(&mut self) {
        self.ignoring = false;
    }
}

#[cfg(test)]
#[path = "error_filter_tests.rs"]
mod tests;
