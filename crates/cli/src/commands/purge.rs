// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use crate::error::Result;

use super::Context;

pub fn run(ctx: &Context, grace_secs: Option<u64>) -> Result<()> {
    let grace = grace_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| ctx.config.sync.to_sync_config().purge_grace);
    let store = ctx.open_store()?;
    let removed = store.purge_synced(grace)?;
    println!("Purged {} synced record(s)", removed);
    Ok(())
}
