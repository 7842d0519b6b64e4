// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background flusher for a running step's snapshot

use super::StepSink;
use mf_core::{BuildId, BuildStep};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

/// Persists the step snapshot on an interval, only when it changed
pub struct ProgressPusher {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

impl ProgressPusher {
    pub fn spawn(
        build_id: BuildId,
        mut snapshot: watch::Receiver<BuildStep>,
        sink: Arc<dyn StepSink>,
        interval: Duration,
    ) -> Self {
        let stop = CancellationToken::new();
        let token = stop.clone();
        let handle = tokio::spawn(async move {
            // A zero period would panic
            let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                match snapshot.has_changed() {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => break,
                }
                let step = snapshot.borrow_and_update().clone();
                tracing::trace!(build_id = %build_id, step = %step.name, log_len = step.log.len(), "progress push");
                if let Err(e) = sink.step_updated(&build_id, &step).await {
                    tracing::warn!(build_id = %build_id, step = %step.name, error = %e, "progress push failed");
                }
            }
        });
        Self { stop, handle }
    }

    /// Stop the pusher and wait for any in-flight push to finish
    pub async fn stop(self) {
        self.stop.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "progress pusher task failed");
        }
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
