// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by siteq are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `SITEQ_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    std::env::var(vars::SITEQ_STATE_DIR).ok().map(PathBuf::from)
}

/// Returns the value of `SITEQ_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    std::env::var(vars::SITEQ_CONFIG).ok().map(PathBuf::from)
}

/// Returns the bearer token from `SITEQ_TOKEN`, ignoring empty values.
pub fn token() -> Option<String> {
    std::env::var(vars::SITEQ_TOKEN)
        .ok()
        .filter(|t| !t.trim().is_empty())
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    std::env::var(vars::XDG_STATE_HOME).ok().map(PathBuf::from)
}

/// Returns the value of `RUST_LOG` if set.
pub fn rust_log() -> Option<String> {
    std::env::var(vars::RUST_LOG).ok()
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
