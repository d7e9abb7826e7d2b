// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running delivery: probe the endpoint and sync whenever it settles
//! into reachability.

use std::future::Future;
use std::sync::Arc;

use sq_core::QueueStore;
use tokio_util::sync::CancellationToken;

use crate::config::ConnectivityConfig;
use crate::connectivity::{ConnectivityMonitor, ReachabilityProbe};
use crate::display::format_item_error;
use crate::env;
use crate::error::{Error, Result};
use crate::sync::{Delivery, HttpDelivery, SyncConfig, SyncOrchestrator};

use super::{acquire_sync_lock, Context};

pub fn run(ctx: &Context) -> Result<()> {
    let ingest_url = ctx.ingest_url()?;
    let connectivity = ctx.config.connectivity.clone();
    let probe = ReachabilityProbe::for_url(
        &ingest_url,
        connectivity.probe_interval(),
        connectivity.probe_timeout(),
    )
    .ok_or_else(|| Error::InvalidIngestUrl {
        url: ingest_url.to_string(),
        reason: "no host or port to probe".to_string(),
    })?;

    let _lock = acquire_sync_lock(&ctx.state_dir)?;
    let store = Arc::new(ctx.open_store()?);
    let config = ctx.config.sync.to_sync_config();
    let delivery = HttpDelivery::new(ingest_url.clone(), config.delivery_timeout)?;

    println!(
        "Watching {} (queue {}); press Ctrl-C to stop",
        ingest_url,
        ctx.queue_path().display()
    );
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(watch_impl(
        store,
        delivery,
        config,
        &connectivity,
        probe,
        env::token(),
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
            }
        },
    ))?;
    println!("Stopped");
    Ok(())
}

/// Deliver on every settled reconnect until `shutdown` completes.
pub(crate) async fn watch_impl<D, S>(
    store: Arc<QueueStore>,
    delivery: D,
    config: SyncConfig,
    connectivity: &ConnectivityConfig,
    probe: ReachabilityProbe,
    token: Option<String>,
    shutdown: S,
) -> Result<()>
where
    D: Delivery + 'static,
    S: Future<Output = ()>,
{
    // Start unreachable so the first successful probe is an edge that
    // triggers the initial pass once it has held for the quiet period.
    let monitor = Arc::new(ConnectivityMonitor::new(
        false,
        connectivity.quiet_period(),
    ));
    let orchestrator = Arc::new(SyncOrchestrator::new(
        store,
        Arc::clone(&monitor),
        delivery,
        config,
    ));
    orchestrator.set_token(token);
    orchestrator.enable_auto_sync();

    let mut progress = orchestrator.subscribe();
    let reporter = tokio::spawn(async move {
        while let Some(snapshot) = progress.recv().await {
            if snapshot.is_final() {
                for error in &snapshot.errors {
                    tracing::warn!("{}", format_item_error(error));
                }
                tracing::info!(
                    completed = snapshot.completed_items,
                    total = snapshot.total_items,
                    "pass finished"
                );
            } else if let Some(id) = &snapshot.current_item_id {
                tracing::debug!(
                    id = %id,
                    completed = snapshot.completed_items,
                    total = snapshot.total_items,
                    "progress"
                );
            }
        }
    });

    let debounce = monitor.spawn();
    let cancel_token = CancellationToken::new();
    tracing::info!(addr = %probe.target(), "watching endpoint");
    let prober = probe.spawn(Arc::clone(&monitor), cancel_token.clone());

    shutdown.await;
    tracing::info!("shutting down");

    cancel_token.cancel();
    let _ = prober.await;
    monitor.shutdown();
    if let Some(debounce) = debounce {
        let _ = debounce.await;
    }
    // Let an in-flight delivery finish before the runtime goes away
    orchestrator.cancel_sync();
    orchestrator.shutdown().await;
    reporter.abort();
    Ok(())
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
