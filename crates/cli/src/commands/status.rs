// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use sq_core::{QueueStore, RecordFilter, SyncStatus};

use crate::cli::OutputFormat;
use crate::error::Result;

use super::Context;

/// Queue health at a glance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct QueueStatus {
    /// Records a pass would attempt.
    pub eligible: usize,
    /// Failed records with no retries left.
    pub needs_attention: usize,
    pub pending: usize,
    pub syncing: usize,
    pub synced: usize,
    pub error: usize,
}

pub fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let store = ctx.open_store()?;
    let status = status_impl(&store, ctx.max_retries())?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Text | OutputFormat::Id => {
            println!("Queue: {}", ctx.queue_path().display());
            match ctx.config.remote.ingest_url.as_deref() {
                Some(url) => println!("Ingest endpoint: {}", url),
                None => println!("Ingest endpoint: (not configured)"),
            }
            println!("Waiting to sync: {}", status.eligible);
            if status.needs_attention > 0 {
                println!(
                    "Needs attention: {} (see `siteq list --attention`)",
                    status.needs_attention
                );
            }
            println!(
                "  pending {}, syncing {}, synced {}, error {}",
                status.pending, status.syncing, status.synced, status.error
            );
        }
    }
    Ok(())
}

pub(crate) fn status_impl(store: &QueueStore, max_retries: u32) -> Result<QueueStatus> {
    let count = |status| store.count(&RecordFilter::status(status));
    Ok(QueueStatus {
        eligible: store.count(&RecordFilter::eligible(max_retries))?,
        needs_attention: store.count(&RecordFilter::exhausted(max_retries))?,
        pending: count(SyncStatus::Pending)?,
        syncing: count(SyncStatus::Syncing)?,
        synced: count(SyncStatus::Synced)?,
        error: count(SyncStatus::Error)?,
    })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
