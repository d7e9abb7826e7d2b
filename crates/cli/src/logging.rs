// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.
//!
//! One-shot commands log warnings to stderr. `siteq watch` runs unattended,
//! so it logs at `info` into `siteq.log` in the state directory, falling back
//! to stderr if the file cannot be opened. `RUST_LOG` overrides the level.

use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::env;

/// Default filter for short-lived commands.
pub const ONE_SHOT_LEVEL: &str = "warn";
/// Default filter for the long-running watcher.
pub const WATCH_LEVEL: &str = "info";

/// Build the filter from `RUST_LOG`, or `default_level` when unset or invalid.
pub fn filter(default_level: &str) -> EnvFilter {
    env::rust_log()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

/// Log to stderr.
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(ONE_SHOT_LEVEL))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Log to `log_path` (appending), or stderr if it cannot be opened.
pub fn init_file(log_path: &Path) {
    if let Some(parent) = log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter(WATCH_LEVEL))
            .with_writer(file)
            .with_ansi(false)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter(WATCH_LEVEL))
            .with_writer(std::io::stderr)
            .try_init();
    }
}
