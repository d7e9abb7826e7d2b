// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot delivery pass.

use std::sync::Arc;
use std::time::Duration;

use sq_core::QueueStore;
use tokio_util::sync::CancellationToken;

use crate::connectivity::{ConnectivityMonitor, ReachabilityProbe};
use crate::display::{format_item_error, format_pass_summary};
use crate::env;
use crate::error::Result;
use crate::sync::{Delivery, HttpDelivery, PassSummary, SyncConfig, SyncOrchestrator};

use super::{acquire_sync_lock, Context};

pub fn run(ctx: &Context, quiet: bool) -> Result<()> {
    let ingest_url = ctx.ingest_url()?;
    let _lock = acquire_sync_lock(&ctx.state_dir)?;
    let store = Arc::new(ctx.open_store()?);
    let config = ctx.config.sync.to_sync_config();
    let delivery = HttpDelivery::new(ingest_url.clone(), config.delivery_timeout)?;
    let connectivity = &ctx.config.connectivity;
    let probe = ReachabilityProbe::for_url(
        &ingest_url,
        connectivity.probe_interval(),
        connectivity.probe_timeout(),
    );

    let rt = tokio::runtime::Runtime::new()?;
    let summary = rt.block_on(sync_impl(store, delivery, config, env::token(), probe))?;

    for error in &summary.errors {
        eprintln!("error: {}", format_item_error(error));
    }
    if !quiet {
        println!("{}", format_pass_summary(&summary));
    }
    Ok(())
}

/// Run a single pass over `store`.
///
/// `probe` keeps checking the endpoint while the pass runs, so a lost
/// connection stops the pass at the next record instead of burning the
/// retry budget of every remaining record. Without a probe the endpoint is
/// assumed reachable and delivery itself reports failures.
pub(crate) async fn sync_impl<D: Delivery>(
    store: Arc<QueueStore>,
    delivery: D,
    config: SyncConfig,
    token: Option<String>,
    probe: Option<ReachabilityProbe>,
) -> Result<PassSummary> {
    let reachable = match &probe {
        Some(probe) => probe.check().await,
        None => true,
    };
    let monitor = Arc::new(ConnectivityMonitor::new(reachable, Duration::ZERO));
    let cancel_token = CancellationToken::new();
    let prober = probe.map(|probe| probe.spawn(Arc::clone(&monitor), cancel_token.clone()));

    let orchestrator = SyncOrchestrator::new(store, monitor, delivery, config);
    orchestrator.set_token(token);
    let result = orchestrator.run_sync_pass().await;
    orchestrator.shutdown().await;

    cancel_token.cancel();
    if let Some(prober) = prober {
        let _ = prober.await;
    }
    Ok(result?)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
