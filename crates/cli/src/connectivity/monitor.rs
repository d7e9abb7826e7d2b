// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reachability state with debounced "became reachable" notification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Callback fired once per settled unreachable -> reachable transition.
pub type ReachableCallback = Box<dyn Fn() + Send + Sync>;

/// Current reachability plus transition notification.
///
/// The host feeds raw signal changes through [`set_reachable`](Self::set_reachable).
/// Each change is queued as an edge so that a short outage is never coalesced
/// away; the debounce task started by [`spawn`](Self::spawn) fires the
/// registered callbacks only after reachability has held for the quiet period.
pub struct ConnectivityMonitor {
    reachable: AtomicBool,
    quiet_period: Duration,
    callbacks: Arc<Mutex<Vec<ReachableCallback>>>,
    edges_tx: mpsc::UnboundedSender<bool>,
    edges_rx: Mutex<Option<mpsc::UnboundedReceiver<bool>>>,
    cancel_token: CancellationToken,
}

impl ConnectivityMonitor {
    /// Create a monitor in the given initial state.
    pub fn new(initially_reachable: bool, quiet_period: Duration) -> Self {
        let (edges_tx, edges_rx) = mpsc::unbounded_channel();
        ConnectivityMonitor {
            reachable: AtomicBool::new(initially_reachable),
            quiet_period,
            callbacks: Arc::new(Mutex::new(Vec::new())),
            edges_tx,
            edges_rx: Mutex::new(Some(edges_rx)),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Point-in-time reachability.
    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::Acquire)
    }

    /// Feed the host's reachability signal. Repeated values are ignored.
    pub fn set_reachable(&self, reachable: bool) {
        let previous = self.reachable.swap(reachable, Ordering::AcqRel);
        if previous == reachable {
            return;
        }
        if reachable {
            tracing::info!("connectivity restored");
        } else {
            tracing::warn!("connectivity lost");
        }
        // Receiver only goes away after shutdown
        let _ = self.edges_tx.send(reachable);
    }

    /// Register a callback for settled unreachable -> reachable transitions.
    pub fn on_became_reachable<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if let Ok(mut callbacks) = self.callbacks.lock() {
            callbacks.push(Box::new(callback));
        }
    }

    /// Start the debounce task. Returns `None` if it was already started.
    pub fn spawn(&self) -> Option<JoinHandle<()>> {
        let edges = self.edges_rx.lock().ok()?.take()?;
        let callbacks = Arc::clone(&self.callbacks);
        let quiet_period = self.quiet_period;
        let cancel_token = self.cancel_token.clone();

        Some(tokio::spawn(async move {
            debounce_edges(edges, callbacks, quiet_period, cancel_token).await;
        }))
    }

    /// Stop the debounce task.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

async fn debounce_edges(
    mut edges: mpsc::UnboundedReceiver<bool>,
    callbacks: Arc<Mutex<Vec<ReachableCallback>>>,
    quiet_period: Duration,
    cancel_token: CancellationToken,
) {
    loop {
        let edge = tokio::select! {
            _ = cancel_token.cancelled() => return,
            edge = edges.recv() => match edge {
                Some(edge) => edge,
                None => return,
            },
        };
        if !edge {
            continue;
        }

        // Raised: wait out the quiet period, abandoning it if the signal drops again
        let deadline = Instant::now() + quiet_period;
        let settled = loop {
            tokio::select! {
                _ = cancel_token.cancelled() => return,
                _ = tokio::time::sleep_until(deadline) => break true,
                edge = edges.recv() => match edge {
                    Some(false) => break false,
                    Some(true) => continue,
                    None => return,
                },
            }
        };
        if !settled {
            tracing::debug!("connectivity flapped during quiet period");
            continue;
        }

        tracing::debug!("connectivity settled, notifying");
        if let Ok(callbacks) = callbacks.lock() {
            for callback in callbacks.iter() {
                callback();
            }
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
