// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FIFO build queue with a single lazily started worker
//!
//! Builds share one working tree, so the worker runs them one at a time.
//! Before a build starts the resource guard is consulted; a busy (or
//! unanswerable) guard sends the build to the back of the queue and the
//! worker sleeps for the configured backoff.

use crate::processor::BuildProcessor;
use mf_adapters::ResourceGuard;
use mf_core::{Build, BuildId};
use mf_runbook::QueueSettings;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{watch, Notify};
use tokio_util::sync::CancellationToken;

struct QueuedBuild {
    build: Build,
    cancel: CancellationToken,
}

struct RunningBuild {
    cancel: CancellationToken,
    done: watch::Receiver<bool>,
}

struct QueueState {
    pending: VecDeque<QueuedBuild>,
    running: HashMap<BuildId, RunningBuild>,
    worker_active: bool,
    /// Parent of every build token handed out since the last `cancel_all`
    root: CancellationToken,
}

struct Inner<G> {
    processor: BuildProcessor,
    guard: G,
    settings: QueueSettings,
    state: Mutex<QueueState>,
    idle: Notify,
}

impl<G> Inner<G> {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Serial build queue
pub struct BuildQueue<G: ResourceGuard> {
    inner: Arc<Inner<G>>,
}

impl<G: ResourceGuard> Clone for BuildQueue<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: ResourceGuard> BuildQueue<G> {
    pub fn new(processor: BuildProcessor, guard: G, settings: QueueSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                processor,
                guard,
                settings,
                state: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    running: HashMap::new(),
                    worker_active: false,
                    root: CancellationToken::new(),
                }),
                idle: Notify::new(),
            }),
        }
    }

    /// Append a build and make sure a worker is draining the queue
    pub fn enqueue(&self, build: Build) -> BuildId {
        let id = build.id.clone();
        let start_worker = {
            let mut state = self.inner.lock();
            let cancel = state.root.child_token();
            state.pending.push_back(QueuedBuild { build, cancel });
            !std::mem::replace(&mut state.worker_active, true)
        };
        tracing::info!(build_id = %id, "build queued");

        if start_worker {
            tracing::debug!("starting queue worker");
            tokio::spawn(drain(Arc::clone(&self.inner)));
        }
        id
    }

    /// Remove a build that has not started; false if it is not queued
    pub fn cancel_queued(&self, id: &BuildId) -> bool {
        let removed = {
            let mut state = self.inner.lock();
            match state.pending.iter().position(|q| &q.build.id == id) {
                Some(pos) => state.pending.remove(pos),
                None => None,
            }
        };
        match removed {
            Some(queued) => {
                queued.cancel.cancel();
                tracing::info!(build_id = %id, "queued build removed");
                self.inner.idle.notify_waiters();
                true
            }
            None => false,
        }
    }

    /// Signal a running build to stop; false if it is not running
    ///
    /// Returns immediately. A build that has not stopped within the
    /// cancel grace period is reported with a warning.
    pub fn cancel(&self, id: &BuildId) -> bool {
        let running = {
            let state = self.inner.lock();
            state
                .running
                .get(id)
                .map(|r| (r.cancel.clone(), r.done.clone()))
        };
        let Some((cancel, done)) = running else {
            return false;
        };
        tracing::info!(build_id = %id, "cancelling build");
        cancel.cancel();
        self.watch_grace(id.clone(), done);
        true
    }

    /// Drop every queued build and cancel every running one
    pub fn cancel_all(&self) {
        let (dropped, running) = {
            let mut state = self.inner.lock();
            state.root.cancel();
            state.root = CancellationToken::new();
            let dropped = std::mem::take(&mut state.pending);
            let running: Vec<_> = state
                .running
                .iter()
                .map(|(id, r)| (id.clone(), r.done.clone()))
                .collect();
            (dropped, running)
        };
        tracing::info!(
            dropped = dropped.len(),
            running = running.len(),
            "cancelling all builds"
        );
        for (id, done) in running {
            self.watch_grace(id, done);
        }
        self.inner.idle.notify_waiters();
    }

    /// Queued build ids, head first
    pub fn pending(&self) -> Vec<BuildId> {
        let state = self.inner.lock();
        state.pending.iter().map(|q| q.build.id.clone()).collect()
    }

    pub fn running(&self) -> Vec<BuildId> {
        let state = self.inner.lock();
        state.running.keys().cloned().collect()
    }

    /// Nothing queued, nothing running, and no worker alive
    pub fn is_idle(&self) -> bool {
        let state = self.inner.lock();
        state.pending.is_empty() && state.running.is_empty() && !state.worker_active
    }

    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a wakeup in between is not lost
            notified.as_mut().enable();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }

    fn watch_grace(&self, id: BuildId, mut done: watch::Receiver<bool>) {
        let grace = self.inner.settings.cancel_grace;
        tokio::spawn(async move {
            let stopped = tokio::time::timeout(grace, done.wait_for(|d| *d))
                .await
                .is_ok();
            if !stopped {
                tracing::warn!(
                    build_id = %id,
                    grace_ms = grace.as_millis() as u64,
                    "build did not stop within grace period"
                );
            }
        });
    }
}

/// Worker loop: runs until the queue is empty
async fn drain<G: ResourceGuard>(inner: Arc<Inner<G>>) {
    loop {
        let head = {
            let mut state = inner.lock();
            let head = state
                .pending
                .front()
                .map(|q| (q.build.id.clone(), q.build.target));
            if head.is_none() {
                state.worker_active = false;
            }
            head.map(|(id, target)| (id, target, state.root.clone()))
        };
        let Some((id, target, root)) = head else {
            tracing::debug!("queue drained, worker exiting");
            inner.idle.notify_waiters();
            return;
        };

        let busy = match inner.guard.is_busy(target).await {
            Ok(busy) => busy,
            Err(e) => {
                tracing::warn!(build_id = %id, error = %e, "resource guard failed, treating as busy");
                true
            }
        };

        if busy {
            {
                let mut state = inner.lock();
                if let Some(pos) = state.pending.iter().position(|q| q.build.id == id) {
                    if let Some(queued) = state.pending.remove(pos) {
                        state.pending.push_back(queued);
                    }
                }
            }
            tracing::info!(
                build_id = %id,
                backoff_ms = inner.settings.backoff.as_millis() as u64,
                "resource busy, build re-queued"
            );
            tokio::select! {
                _ = tokio::time::sleep(inner.settings.backoff) => {}
                _ = root.cancelled() => {}
            }
            continue;
        }

        let (done_tx, done_rx) = watch::channel(false);
        let queued = {
            let mut state = inner.lock();
            let Some(pos) = state.pending.iter().position(|q| q.build.id == id) else {
                // Cancelled while the guard was being asked
                continue;
            };
            let Some(queued) = state.pending.remove(pos) else {
                continue;
            };
            state.running.insert(
                id.clone(),
                RunningBuild {
                    cancel: queued.cancel.clone(),
                    done: done_rx,
                },
            );
            queued
        };

        run_one(&inner, queued).await;

        let _ = done_tx.send(true);
        inner.lock().running.remove(&id);
        inner.idle.notify_waiters();
    }
}

async fn run_one<G>(inner: &Inner<G>, queued: QueuedBuild) {
    let id = queued.build.id.clone();
    tracing::info!(build_id = %id, "build starting");

    let processor = inner.processor.clone();
    let handle = tokio::spawn(async move {
        processor
            .process_build_with_error_handling(queued.build, queued.cancel)
            .await
    });

    match handle.await {
        Ok(build) => tracing::info!(build_id = %id, status = %build.status, "build done"),
        Err(e) => {
            tracing::error!(build_id = %id, error = %e, "build task panicked");
            inner.processor.record_failure(&id).await;
        }
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
