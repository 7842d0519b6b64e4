// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notification adapter

use super::{NotifyAdapter, NotifyError};
use async_trait::async_trait;
use tokio::process::Command;

/// Shows build notifications on the local desktop.
///
/// Uses `terminal-notifier` on macOS and `notify-send` elsewhere; the
/// channel becomes the notification title.
#[derive(Clone, Copy, Debug, Default)]
pub struct DesktopNotifyAdapter;

impl DesktopNotifyAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifyAdapter for DesktopNotifyAdapter {
    async fn send(&self, channel: &str, message: &str) -> Result<(), NotifyError> {
        let output = if cfg!(target_os = "macos") {
            Command::new("terminal-notifier")
                .args(["-title", channel, "-message", message])
                .output()
                .await
        } else {
            Command::new("notify-send").args([channel, message]).output().await
        };

        let output = output.map_err(|e| NotifyError::DeliveryFailed(e.to_string()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(NotifyError::DeliveryFailed(stderr.trim().to_string()));
        }

        tracing::info!(channel, "desktop notification sent");
        Ok(())
    }
}
