// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::error::Error;
use crate::sync::test_helpers::{enqueue_n, fast_config, MockDelivery};
use crate::sync::SyncError;
use crate::sync::StopReason;
use sq_core::{RecordFilter, SyncStatus};
use std::net::TcpListener;
use std::sync::Mutex;

fn probe_for(addr: &str) -> ReachabilityProbe {
    ReachabilityProbe::new(addr, Duration::from_millis(10), Duration::from_millis(500))
}

#[tokio::test]
async fn delivers_queue_in_order() {
    let store = Arc::new(QueueStore::open_in_memory().unwrap());
    let ids = enqueue_n(&store, 3);
    let delivery = MockDelivery::new();

    let summary = sync_impl(
        Arc::clone(&store),
        delivery.clone(),
        fast_config(),
        Some("secret".into()),
        None,
    )
    .await
    .unwrap();

    assert_eq!(summary.total_items, 3);
    assert_eq!(summary.completed_items, 3);
    assert!(summary.errors.is_empty());
    assert_eq!(delivery.attempted_ids(), ids);
    assert!(delivery.tokens().iter().all(|t| t.as_deref() == Some("secret")));
    assert_eq!(
        store.count(&RecordFilter::status(SyncStatus::Synced)).unwrap(),
        3
    );
}

#[tokio::test]
async fn unreachable_endpoint_is_offline() {
    let store = Arc::new(QueueStore::open_in_memory().unwrap());
    enqueue_n(&store, 2);
    let delivery = MockDelivery::new();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = sync_impl(
        Arc::clone(&store),
        delivery.clone(),
        fast_config(),
        None,
        Some(probe_for(&addr.to_string())),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Sync(SyncError::Offline)));
    assert!(delivery.attempted_ids().is_empty());
    assert_eq!(
        store.count(&RecordFilter::status(SyncStatus::Pending)).unwrap(),
        2
    );
}

#[tokio::test]
async fn failures_are_reported_in_summary() {
    let store = Arc::new(QueueStore::open_in_memory().unwrap());
    let ids = enqueue_n(&store, 2);
    let delivery = MockDelivery::new();
    delivery.fail_always(&ids[0]);

    let summary = sync_impl(Arc::clone(&store), delivery, fast_config(), None, None)
        .await
        .unwrap();

    assert_eq!(summary.completed_items, 1);
    let exhausted: Vec<_> = summary.exhausted().map(|e| e.id.as_str()).collect();
    assert_eq!(exhausted, vec![ids[0].as_str()]);
    assert_eq!(store.get(&ids[0]).unwrap().retry_count, 3);
}

#[tokio::test]
async fn connection_lost_mid_pass_leaves_remaining_records_pending() {
    let store = Arc::new(QueueStore::open_in_memory().unwrap());
    let ids = enqueue_n(&store, 3);
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    // The endpoint disappears while the first record is being delivered
    let endpoint = Mutex::new(Some(listener));
    let delivery = MockDelivery::new();
    delivery.stall(Duration::from_millis(300));
    delivery.on_attempt(move |_| {
        endpoint.lock().unwrap().take();
    });

    let summary = sync_impl(
        Arc::clone(&store),
        delivery.clone(),
        fast_config(),
        None,
        Some(probe_for(&addr)),
    )
    .await
    .unwrap();

    assert_eq!(summary.stopped, Some(StopReason::ConnectivityLost));
    assert_eq!(summary.completed_items, 1);
    assert!(summary.errors.is_empty());
    assert_eq!(delivery.attempted_ids(), vec![ids[0].clone()]);
    for id in &ids[1..] {
        let record = store.get(id).unwrap();
        assert_eq!(record.sync_status, SyncStatus::Pending);
        assert_eq!(record.retry_count, 0);
    }
}
