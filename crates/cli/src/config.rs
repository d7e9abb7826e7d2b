// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration management.
//!
//! Configuration is stored in `config.toml` inside the state directory
//! (or wherever `--config` / `SITEQ_CONFIG` points) and includes:
//! - `[queue]`: where the queue database lives
//! - `[sync]`: retry budget, backoff and timeouts
//! - `[connectivity]`: debounce quiet period and probe cadence
//! - `[remote]`: the media-ingest endpoint
//!
//! Every field has a default, so a missing file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::SyncConfig;

const APP_DIR_NAME: &str = "siteq";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "queue.db";
const LOCK_FILE_NAME: &str = "sync.lock";
const LOG_FILE_NAME: &str = "siteq.log";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub connectivity: ConnectivityConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// Queue storage location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Database path (relative to the config file's directory, or absolute).
    /// Defaults to `queue.db` in the state directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Retry and pacing policy for sync passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSection {
    /// Failed attempts before a record needs a manual requeue (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff after the first failure in milliseconds (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Cap on a single backoff delay in seconds (default: 30).
    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
    /// Bound on one delivery attempt in seconds (default: 60).
    #[serde(default = "default_delivery_timeout_secs")]
    pub delivery_timeout_secs: u64,
    /// How long delivered records are kept in seconds (default: 5).
    #[serde(default = "default_purge_grace_secs")]
    pub purge_grace_secs: u64,
    /// Also back off after a record's final failure (default: true).
    #[serde(default = "default_backoff_after_final_failure")]
    pub backoff_after_final_failure: bool,
}

/// Reachability tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// Time connectivity must hold before an automatic pass, in milliseconds (default: 3000).
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,
    /// Reachability probe interval in milliseconds (default: 5000).
    #[serde(default = "default_probe_interval_ms")]
    pub probe_interval_ms: u64,
    /// Reachability probe connect timeout in milliseconds (default: 2000).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

/// Remote media-ingest endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// URL records are POSTed to (e.g. `https://api.example.com/v1/media`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingest_url: Option<String>,
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_secs() -> u64 {
    30
}

fn default_delivery_timeout_secs() -> u64 {
    60
}

fn default_purge_grace_secs() -> u64 {
    5
}

fn default_backoff_after_final_failure() -> bool {
    true
}

fn default_quiet_period_ms() -> u64 {
    3000
}

fn default_probe_interval_ms() -> u64 {
    5000
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

impl Default for SyncSection {
    fn default() -> Self {
        SyncSection {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_secs: default_max_delay_secs(),
            delivery_timeout_secs: default_delivery_timeout_secs(),
            purge_grace_secs: default_purge_grace_secs(),
            backoff_after_final_failure: default_backoff_after_final_failure(),
        }
    }
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        ConnectivityConfig {
            quiet_period_ms: default_quiet_period_ms(),
            probe_interval_ms: default_probe_interval_ms(),
            probe_timeout_ms: default_probe_timeout_ms(),
        }
    }
}

impl SyncSection {
    /// Orchestrator policy described by this section.
    pub fn to_sync_config(&self) -> SyncConfig {
        SyncConfig {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_secs(self.max_delay_secs),
            delivery_timeout: Duration::from_secs(self.delivery_timeout_secs),
            purge_grace: Duration::from_secs(self.purge_grace_secs),
            backoff_after_final_failure: self.backoff_after_final_failure,
        }
    }
}

impl ConnectivityConfig {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl RemoteConfig {
    /// Parses and validates the ingest URL, if configured.
    ///
    /// Only `http` and `https` endpoints are accepted.
    pub fn ingest_url(&self) -> Result<Option<Url>> {
        let Some(raw) = self.ingest_url.as_deref() else {
            return Ok(None);
        };
        let url = Url::parse(raw).map_err(|e| Error::InvalidIngestUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(Some(url)),
            scheme => Err(Error::InvalidIngestUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme '{scheme}', use http or https"),
            }),
        }
    }
}

impl Config {
    /// Loads configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Saves configuration to `path`, creating its directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the queue database path against the config file's directory.
    pub fn queue_path(&self, config_dir: &Path, state_dir: &Path) -> PathBuf {
        match &self.queue.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => config_dir.join(path),
            None => state_dir.join(DB_FILE_NAME),
        }
    }
}

/// Directory holding the queue, lock and log files.
///
/// Resolution order: `SITEQ_STATE_DIR`, `$XDG_STATE_HOME/siteq`, `~/.local/state/siteq`.
pub fn state_dir() -> Result<PathBuf> {
    if let Some(dir) = env::state_dir() {
        return Ok(dir);
    }
    if let Some(xdg) = env::xdg_state_home() {
        return Ok(xdg.join(APP_DIR_NAME));
    }
    dirs::home_dir()
        .map(|home| home.join(".local").join("state").join(APP_DIR_NAME))
        .ok_or_else(|| Error::Config("cannot determine state directory".to_string()))
}

/// Config file location: explicit flag, then `SITEQ_CONFIG`, then the state directory.
pub fn config_path(explicit: Option<&Path>, state_dir: &Path) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(env::config_path)
        .unwrap_or_else(|| state_dir.join(CONFIG_FILE_NAME))
}

/// Lock file serializing sync passes across processes.
pub fn lock_path(state_dir: &Path) -> PathBuf {
    state_dir.join(LOCK_FILE_NAME)
}

/// Log file used by `siteq watch`.
pub fn log_path(state_dir: &Path) -> PathBuf {
    state_dir.join(LOG_FILE_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
