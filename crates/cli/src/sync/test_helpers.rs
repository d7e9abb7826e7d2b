// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sq_core::{CaptureMetadata, MediaKind, OfflineRecord, QueueStore};
use tokio::sync::Notify;
use tokio::time::Instant;

use super::delivery::{Delivery, DeliveryError, DeliveryResult, Receipt};
use super::orchestrator::{SyncConfig, SyncOrchestrator};
use crate::connectivity::ConnectivityMonitor;

type AttemptHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Blocks delivery of one record until released.
pub struct Gate {
    id: String,
    /// Notified when the gated delivery has started.
    pub entered: Arc<Notify>,
    /// Notify to let the gated delivery finish.
    pub release: Arc<Notify>,
}

#[derive(Default)]
struct MockState {
    attempts: Mutex<Vec<(String, Instant)>>,
    tokens: Mutex<Vec<Option<String>>>,
    fail_always: Mutex<HashSet<String>>,
    fail_times: Mutex<HashMap<String, u32>>,
    stall: Mutex<Option<Duration>>,
    gate: Mutex<Option<Gate>>,
    hook: Mutex<Option<AttemptHook>>,
}

impl MockState {
    fn should_fail(&self, id: &str) -> bool {
        if self.fail_always.lock().unwrap().contains(id) {
            return true;
        }
        let mut fail_times = self.fail_times.lock().unwrap();
        match fail_times.get_mut(id) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Mock delivery for testing without a network.
///
/// Clones share state, so a test keeps one handle while the orchestrator owns another.
#[derive(Clone, Default)]
pub struct MockDelivery {
    state: Arc<MockState>,
}

impl MockDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delivery of `id` fails.
    pub fn fail_always(&self, id: &str) {
        self.state.fail_always.lock().unwrap().insert(id.to_string());
    }

    /// The next `times` deliveries of `id` fail.
    pub fn fail_times(&self, id: &str, times: u32) {
        self.state
            .fail_times
            .lock()
            .unwrap()
            .insert(id.to_string(), times);
    }

    /// Every delivery takes `duration` before answering.
    pub fn stall(&self, duration: Duration) {
        *self.state.stall.lock().unwrap() = Some(duration);
    }

    /// Hold the next delivery of `id` until the returned gate is released.
    pub fn gate(&self, id: &str) -> (Arc<Notify>, Arc<Notify>) {
        let gate = Gate {
            id: id.to_string(),
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        };
        let handles = (Arc::clone(&gate.entered), Arc::clone(&gate.release));
        *self.state.gate.lock().unwrap() = Some(gate);
        handles
    }

    /// Run `hook` with the record id at the start of every delivery.
    pub fn on_attempt<F>(&self, hook: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        *self.state.hook.lock().unwrap() = Some(Arc::new(hook));
    }

    /// Ids in the order deliveries were attempted.
    pub fn attempted_ids(&self) -> Vec<String> {
        self.state
            .attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Start instants of every delivery attempt.
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.state
            .attempts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }

    /// Tokens passed to each delivery.
    pub fn tokens(&self) -> Vec<Option<String>> {
        self.state.tokens.lock().unwrap().clone()
    }
}

impl Delivery for MockDelivery {
    fn deliver<'a>(
        &'a self,
        record: &'a OfflineRecord,
        token: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = DeliveryResult<Receipt>> + Send + 'a>> {
        let state = Arc::clone(&self.state);
        let id = record.id.clone();
        let token = token.map(String::from);

        Box::pin(async move {
            state
                .attempts
                .lock()
                .unwrap()
                .push((id.clone(), Instant::now()));
            state.tokens.lock().unwrap().push(token);

            let hook = state.hook.lock().unwrap().clone();
            if let Some(hook) = hook {
                hook(&id);
            }

            let gate = {
                let mut slot = state.gate.lock().unwrap();
                if slot.as_ref().is_some_and(|g| g.id == id) {
                    slot.take()
                } else {
                    None
                }
            };
            if let Some(gate) = gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }

            let stall = *state.stall.lock().unwrap();
            if let Some(stall) = stall {
                tokio::time::sleep(stall).await;
            }

            if state.should_fail(&id) {
                Err(DeliveryError::Rejected {
                    status: 500,
                    message: "mock failure".to_string(),
                })
            } else {
                Ok(Receipt {
                    remote_id: Some(format!("remote-{id}")),
                })
            }
        })
    }
}

/// An orchestrator wired to an in-memory store and a reachable monitor.
pub struct Harness {
    pub store: Arc<QueueStore>,
    pub monitor: Arc<ConnectivityMonitor>,
    pub delivery: MockDelivery,
    pub orchestrator: Arc<SyncOrchestrator<MockDelivery>>,
}

pub fn harness(config: SyncConfig) -> Harness {
    harness_with_store(Arc::new(QueueStore::open_in_memory().unwrap()), config)
}

pub fn harness_with_store(store: Arc<QueueStore>, config: SyncConfig) -> Harness {
    let monitor = Arc::new(ConnectivityMonitor::new(true, Duration::from_secs(3)));
    let delivery = MockDelivery::new();
    let orchestrator = Arc::new(SyncOrchestrator::new(
        Arc::clone(&store),
        Arc::clone(&monitor),
        delivery.clone(),
        config,
    ));
    Harness {
        store,
        monitor,
        delivery,
        orchestrator,
    }
}

/// Policy with short delays for tests running on real time.
pub fn fast_config() -> SyncConfig {
    SyncConfig {
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(100),
        delivery_timeout: Duration::from_secs(10),
        ..SyncConfig::default()
    }
}

/// Enqueue `n` photos for one project, returning their ids in order.
pub fn enqueue_n(store: &QueueStore, n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            store
                .enqueue(
                    format!("capture-{i}").as_bytes(),
                    &CaptureMetadata::new("site-7", MediaKind::Photo),
                )
                .unwrap()
        })
        .collect()
}
