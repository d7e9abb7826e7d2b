// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! siteq - offline capture queue and sync engine.
//!
//! Field devices capture media while the network comes and goes. This crate
//! drives delivery of the durable queue kept by [`sq_core::QueueStore`] to a
//! remote ingest endpoint.
//!
//! # Main Components
//!
//! - [`sync::SyncOrchestrator`] - one FIFO delivery pass at a time, with
//!   retries, backoff, cancellation and progress reporting
//! - [`connectivity::ConnectivityMonitor`] - debounced reachability edges
//!   that trigger automatic passes
//! - [`sync::Delivery`] - the "deliver one item" seam, with
//!   [`sync::HttpDelivery`] as the production implementation
//! - [`Config`] - `config.toml` settings
//!
//! # Embedding
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use siteq::connectivity::ConnectivityMonitor;
//! use siteq::sync::{HttpDelivery, SyncConfig, SyncOrchestrator};
//! use sq_core::QueueStore;
//!
//! let store = Arc::new(QueueStore::open(&path)?);
//! let monitor = Arc::new(ConnectivityMonitor::new(true, Duration::from_secs(3)));
//! let delivery = HttpDelivery::new(ingest_url, Duration::from_secs(60))?;
//! let orchestrator = Arc::new(SyncOrchestrator::new(store, monitor, delivery, SyncConfig::default()));
//! orchestrator.enable_auto_sync();
//! let summary = orchestrator.run_sync_pass().await?;
//! ```

mod cli;
mod commands;
mod display;

pub mod config;
pub mod connectivity;
pub mod env;
pub mod error;
pub mod logging;
pub mod sync;

pub use cli::{CaptureArgs, Cli, Command, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};

use commands::Context;

/// Execute a CLI invocation. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let Cli {
        config: config_flag,
        command,
    } = cli;

    if let Command::Completion { shell } = command {
        commands::completion::run(shell);
        return Ok(());
    }

    let ctx = Context::load(config_flag.as_deref())?;
    match command {
        Command::Watch => logging::init_file(&config::log_path(&ctx.state_dir)),
        _ => logging::init_stderr(),
    }

    match command {
        Command::Init { ingest_url } => commands::init::run(ctx, ingest_url),
        Command::Enqueue {
            file,
            capture,
            output,
        } => commands::enqueue::run(&ctx, &file, capture, output),
        Command::List {
            status,
            project,
            attention,
            output,
        } => commands::list::run(&ctx, status, project, attention, output),
        Command::Status { output } => commands::status::run(&ctx, output),
        Command::Sync { quiet } => commands::sync::run(&ctx, quiet),
        Command::Requeue { ids } => commands::queue::requeue(&ctx, &ids),
        Command::Remove { ids } => commands::queue::remove(&ctx, &ids),
        Command::Purge { grace_secs } => commands::purge::run(&ctx, grace_secs),
        Command::Watch => commands::watch::run(&ctx),
        Command::Completion { shell } => {
            commands::completion::run(shell);
            Ok(())
        }
    }
}
