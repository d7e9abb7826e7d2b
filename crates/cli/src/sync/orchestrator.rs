// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The single delivery process.
//!
//! A pass claims eligible records in enqueue order and delivers them one at
//! a time. A failed record is retried in place, with exponential backoff,
//! until it is delivered or its retry budget is spent; only then does the
//! pass move on, so a later record is never attempted ahead of an earlier one.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use sq_core::{CaptureMetadata, OfflineRecord, QueueStore, RecordFilter, SyncStatus};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use super::delivery::{Delivery, DeliveryError, Receipt};
use super::progress::{ItemError, PassSummary, StopReason, SyncProgress};
use crate::connectivity::ConnectivityMonitor;

/// Pass-level failures. Per-item delivery failures never surface here.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Another pass holds the orchestrator.
    #[error("a sync pass is already in progress")]
    AlreadyInProgress,

    /// Not reachable when the pass was requested; no record was touched.
    #[error("offline: the remote service is not reachable")]
    Offline,

    /// The queue store failed; the pass was aborted.
    #[error(transparent)]
    Store(#[from] sq_core::Error),
}

/// Retry and pacing policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Failed attempts after which a record needs a manual requeue.
    pub max_retries: u32,
    /// Delay after the first failure; doubles with every further failure.
    pub base_delay: Duration,
    /// Upper bound for a single backoff delay.
    pub max_delay: Duration,
    /// Bound on one delivery attempt.
    pub delivery_timeout: Duration,
    /// How long `synced` records are kept before purging.
    pub purge_grace: Duration,
    /// Also pause after a record's last permitted failure before moving on.
    pub backoff_after_final_failure: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            delivery_timeout: Duration::from_secs(60),
            purge_grace: Duration::from_secs(5),
            backoff_after_final_failure: true,
        }
    }
}

/// Delay after the `retry_count`-th failure: `base * 2^(retry_count - 1)`, capped at `max`.
pub fn backoff_delay(base: Duration, max: Duration, retry_count: u32) -> Duration {
    let exponent = retry_count.saturating_sub(1).min(31);
    base.saturating_mul(1u32 << exponent).min(max)
}

/// `pass_state` bit: a pass is executing.
const RUNNING: u8 = 0b01;
/// `pass_state` bit: the running pass should stop at the next record boundary.
const CANCELLED: u8 = 0b10;

/// Holds the "pass running" bit; released on drop, even if the pass future is dropped.
struct PassGuard<'a> {
    state: &'a AtomicU8,
}

impl<'a> PassGuard<'a> {
    /// Set `RUNNING` and clear any stale `CANCELLED` in one step, so a cancel
    /// that observes the pass as running is never lost.
    fn acquire(state: &'a AtomicU8) -> Option<Self> {
        state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current & RUNNING == 0).then_some(RUNNING)
            })
            .ok()
            .map(|_| PassGuard { state })
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.state.fetch_and(!RUNNING, Ordering::AcqRel);
    }
}

/// How processing of one record ended.
enum ItemEnd {
    /// Synced, or failed with retries exhausted.
    Done,
    /// Failed with retries left, and the pass must stop.
    Stopped(StopReason),
}

/// The delivery process: owns the pass flag and the handles it needs.
///
/// Construct once per queue and share behind an [`Arc`].
pub struct SyncOrchestrator<D> {
    store: Arc<QueueStore>,
    connectivity: Arc<ConnectivityMonitor>,
    delivery: D,
    config: SyncConfig,
    pass_state: AtomicU8,
    cancel_notify: Notify,
    token: RwLock<Option<String>>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<SyncProgress>>>,
    cancel_token: CancellationToken,
    /// Automatic passes and purges; drained by [`shutdown`](Self::shutdown).
    tasks: Mutex<JoinSet<()>>,
}

impl<D: Delivery> SyncOrchestrator<D> {
    pub fn new(
        store: Arc<QueueStore>,
        connectivity: Arc<ConnectivityMonitor>,
        delivery: D,
        config: SyncConfig,
    ) -> Self {
        SyncOrchestrator {
            store,
            connectivity,
            delivery,
            config,
            pass_state: AtomicU8::new(0),
            cancel_notify: Notify::new(),
            token: RwLock::new(None),
            subscribers: Mutex::new(Vec::new()),
            cancel_token: CancellationToken::new(),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<QueueStore> {
        &self.store
    }

    /// Set the bearer token handed to every delivery.
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }

    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    /// Queue a capture. Visible to the next pass, not to one already running.
    pub fn enqueue(&self, payload: &[u8], metadata: &CaptureMetadata) -> sq_core::Result<String> {
        self.store.enqueue(payload, metadata)
    }

    /// Returns true while a pass is executing.
    pub fn is_running(&self) -> bool {
        self.pass_state.load(Ordering::Acquire) & RUNNING != 0
    }

    /// Receive a snapshot after every processed record and at the end of every pass.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SyncProgress> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(tx);
        }
        rx
    }

    fn publish(&self, progress: SyncProgress) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.retain(|tx| tx.send(progress.clone()).is_ok());
        }
    }

    /// Ask the running pass to stop at the next record boundary.
    ///
    /// An in-flight delivery is never interrupted. A cancel while idle is
    /// forgotten when the next pass starts.
    pub fn cancel_sync(&self) {
        let previous = self.pass_state.fetch_or(CANCELLED, Ordering::AcqRel);
        if previous & RUNNING != 0 {
            tracing::info!("sync cancellation requested");
        }
        self.cancel_notify.notify_waiters();
    }

    /// Pending plus retryable-error records.
    pub fn queue_depth(&self) -> sq_core::Result<usize> {
        self.store
            .count(&RecordFilter::eligible(self.config.max_retries))
    }

    /// Records that spent their retry budget and need a manual requeue.
    pub fn attention_count(&self) -> sq_core::Result<usize> {
        self.store
            .count(&RecordFilter::exhausted(self.config.max_retries))
    }

    /// Manual re-enqueue of a failed record (`retry_count` back to 0).
    pub fn requeue(&self, id: &str) -> sq_core::Result<()> {
        self.store.requeue(id)
    }

    /// Stop background work and wait for it to finish.
    ///
    /// A running pass stops at the next record boundary and any backoff is
    /// cut short, but an in-flight delivery is allowed to complete first.
    /// No automatic pass starts once this has been called.
    pub async fn shutdown(&self) {
        let mut tasks = {
            let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
            self.cancel_token.cancel();
            std::mem::take(&mut *tasks)
        };
        self.cancel_notify.notify_waiters();

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "background sync task failed");
            }
        }
    }

    /// Run `task` in the background unless shutdown has begun.
    ///
    /// The cancellation check and the spawn happen under the task lock, so
    /// [`shutdown`](Self::shutdown) never misses a task started concurrently.
    fn spawn_tracked<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if self.cancel_token.is_cancelled() {
            return;
        }
        // Reap finished tasks so the set does not grow across a long watch
        while tasks.try_join_next().is_some() {}
        tasks.spawn(task);
    }

    fn stop_reason(&self) -> Option<StopReason> {
        if self.pass_state.load(Ordering::Acquire) & CANCELLED != 0
            || self.cancel_token.is_cancelled()
        {
            Some(StopReason::Cancelled)
        } else if !self.connectivity.is_reachable() {
            Some(StopReason::ConnectivityLost)
        } else {
            None
        }
    }

    /// Run one pass over every eligible record.
    ///
    /// Fails without touching any record if a pass is already running or
    /// the service is unreachable. A store failure aborts the pass; the
    /// record in flight stays `syncing` and is recovered by the next pass.
    pub async fn run_sync_pass(&self) -> Result<PassSummary, SyncError> {
        let Some(_guard) = PassGuard::acquire(&self.pass_state) else {
            tracing::debug!("sync pass already in progress");
            return Err(SyncError::AlreadyInProgress);
        };
        if !self.connectivity.is_reachable() {
            tracing::debug!("sync pass skipped: offline");
            return Err(SyncError::Offline);
        }

        self.store.recover_interrupted()?;
        if let Err(e) = self.store.purge_synced(self.config.purge_grace) {
            tracing::warn!(error = %e, "purge before pass failed");
        }

        let eligible = self
            .store
            .list(&RecordFilter::eligible(self.config.max_retries))?;
        let mut summary = PassSummary::new(eligible.len());
        tracing::info!(total = summary.total_items, "sync pass started");

        for record in &eligible {
            if let Some(reason) = self.stop_reason() {
                summary.stopped = Some(reason);
                break;
            }
            let end = self.process(record, &mut summary).await?;
            self.publish(summary.snapshot(Some(&record.id)));
            if let ItemEnd::Stopped(reason) = end {
                summary.stopped = Some(reason);
                break;
            }
        }

        self.publish(summary.snapshot(None));
        self.schedule_purge();

        match summary.stopped {
            Some(reason) => tracing::info!(
                completed = summary.completed_items,
                total = summary.total_items,
                %reason,
                "sync pass stopped early"
            ),
            None => tracing::info!(
                completed = summary.completed_items,
                total = summary.total_items,
                failed = summary.errors.len(),
                "sync pass finished"
            ),
        }
        Ok(summary)
    }

    /// Deliver one record, retrying in place while its budget lasts.
    async fn process(
        &self,
        record: &OfflineRecord,
        summary: &mut PassSummary,
    ) -> Result<ItemEnd, SyncError> {
        let mut retry_count = record.retry_count;

        loop {
            self.store
                .update_status(&record.id, SyncStatus::Syncing, None)?;

            let failure = match self.attempt(record).await {
                Ok(receipt) => {
                    self.store
                        .update_status(&record.id, SyncStatus::Synced, None)?;
                    summary.completed_items += 1;
                    tracing::info!(
                        id = %record.id,
                        remote_id = receipt.remote_id.as_deref().unwrap_or("-"),
                        "delivered"
                    );
                    return Ok(ItemEnd::Done);
                }
                Err(e) => e,
            };

            retry_count = retry_count.saturating_add(1);
            self.store
                .update_status(&record.id, SyncStatus::Error, Some(retry_count))?;
            let exhausted = retry_count >= self.config.max_retries;
            tracing::warn!(id = %record.id, retry_count, exhausted, error = %failure, "delivery failed");

            let error = ItemError {
                id: record.id.clone(),
                reason: failure.to_string(),
                retry_count,
                exhausted,
            };

            if exhausted {
                summary.errors.push(error);
                if self.config.backoff_after_final_failure {
                    self.backoff(retry_count).await;
                }
                return Ok(ItemEnd::Done);
            }

            self.backoff(retry_count).await;
            if let Some(reason) = self.stop_reason() {
                summary.errors.push(error);
                return Ok(ItemEnd::Stopped(reason));
            }
        }
    }

    async fn attempt(&self, record: &OfflineRecord) -> Result<Receipt, DeliveryError> {
        let token = self.token();
        let delivery = self.delivery.deliver(record, token.as_deref());
        match tokio::time::timeout(self.config.delivery_timeout, delivery).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout),
        }
    }

    async fn backoff(&self, retry_count: u32) {
        let delay = backoff_delay(self.config.base_delay, self.config.max_delay, retry_count);
        let cancelled = self.cancel_notify.notified();
        if delay.is_zero() || self.stop_reason() == Some(StopReason::Cancelled) {
            return;
        }

        tracing::debug!(?delay, retry_count, "backing off");
        tokio::select! {
            _ = self.cancel_token.cancelled() => {}
            _ = cancelled => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }

    /// Best-effort purge once the grace period has passed.
    fn schedule_purge(&self) {
        let store = Arc::clone(&self.store);
        let grace = self.config.purge_grace;
        let cancel_token = self.cancel_token.clone();

        self.spawn_tracked(async move {
            tokio::select! {
                _ = cancel_token.cancelled() => return,
                _ = tokio::time::sleep(grace) => {}
            }
            match store.purge_synced(grace) {
                Ok(0) => {}
                Ok(removed) => tracing::debug!(removed, "purged synced records"),
                Err(e) => tracing::warn!(error = %e, "purge after pass failed"),
            }
        });
    }
}

impl<D: Delivery + 'static> SyncOrchestrator<D> {
    /// Start a pass whenever connectivity settles after an outage.
    pub fn enable_auto_sync(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.connectivity.on_became_reachable(move || {
            let Some(orchestrator) = weak.upgrade() else {
                return;
            };
            let pass = Arc::clone(&orchestrator);
            orchestrator.spawn_tracked(async move {
                match pass.run_sync_pass().await {
                    Ok(summary) => tracing::info!(
                        completed = summary.completed_items,
                        total = summary.total_items,
                        "automatic sync pass done"
                    ),
                    Err(SyncError::AlreadyInProgress) => {
                        tracing::debug!("automatic sync skipped: pass already running")
                    }
                    Err(e) => tracing::warn!(error = %e, "automatic sync pass failed"),
                }
            });
        });
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
