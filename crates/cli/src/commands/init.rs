// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::config::RemoteConfig;
use crate::error::{Error, Result};

use super::Context;

pub fn run(ctx: Context, ingest_url: Option<String>) -> Result<()> {
    let ctx = init_impl(ctx, ingest_url)?;

    println!("Initialized capture queue at {}", ctx.queue_path().display());
    println!("Config: {}", ctx.config_path.display());
    match ctx.config.remote.ingest_url.as_deref() {
        Some(url) => println!("Ingest endpoint: {}", url),
        None => println!(
            "No ingest endpoint yet; set [remote] ingest_url in {}",
            ctx.config_path.display()
        ),
    }
    Ok(())
}

/// Write the config file and create the queue database.
pub(crate) fn init_impl(mut ctx: Context, ingest_url: Option<String>) -> Result<Context> {
    if ctx.config_path.exists() {
        return Err(Error::AlreadyInitialized(
            ctx.config_path.display().to_string(),
        ));
    }

    if let Some(url) = ingest_url {
        let remote = RemoteConfig {
            ingest_url: Some(url.trim().to_string()),
        };
        remote.ingest_url()?;
        ctx.config.remote = remote;
    }

    std::fs::create_dir_all(&ctx.state_dir)?;
    ctx.config.save(&ctx.config_path)?;
    ctx.open_store()?.close()?;
    Ok(ctx)
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
