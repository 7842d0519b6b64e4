// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tagged structured log lines embedded in process output
//!
//! A structured line starts with [`STRUCTURED_TAG`] followed by one or more
//! JSON objects: `##mf{"message":"Copying mods","colour":"#0c78ff"}`.

use serde::Deserialize;

/// Prefix marking a structured log line
pub const STRUCTURED_TAG: &str = "##mf";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StructuredMessage {
    pub message: String,
    #[serde(default, alias = "color")]
    pub colour: String,
}

/// Parse a structured line into its messages
///
/// Returns `None` when the line is untagged or any object fails to parse.
pub fn parse_structured(line: &str) -> Option<Vec<StructuredMessage>> {
    let body = line.strip_prefix(STRUCTURED_TAG)?;
    let messages = serde_json::Deserializer::from_str(body)
        .into_iter::<StructuredMessage>()
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    if messages.is_empty() {
        return None;
    }
    Some(messages)
}

#[cfg(test)]
#[path = "structured_tests.rs"]
mod tests;
