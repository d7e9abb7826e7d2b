// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod completion;
pub mod enqueue;
pub mod init;
pub mod list;
pub mod purge;
pub mod queue;
pub mod status;
pub mod sync;
pub mod watch;

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use reqwest::Url;
use sq_core::QueueStore;

use crate::config::{self, Config};
use crate::error::{Error, Result};

/// Resolved locations and settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub state_dir: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
}

impl Context {
    /// Resolve the state directory and load the config file.
    pub fn load(config_flag: Option<&Path>) -> Result<Self> {
        let state_dir = config::state_dir()?;
        Self::load_from(state_dir, config_flag)
    }

    /// Load with an already-resolved state directory.
    pub fn load_from(state_dir: PathBuf, config_flag: Option<&Path>) -> Result<Self> {
        let config_path = config::config_path(config_flag, &state_dir);
        let config = Config::load(&config_path)?;
        Ok(Context {
            state_dir,
            config_path,
            config,
        })
    }

    /// Directory relative queue paths resolve against.
    pub fn config_dir(&self) -> &Path {
        self.config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(&self.state_dir)
    }

    pub fn queue_path(&self) -> PathBuf {
        self.config.queue_path(self.config_dir(), &self.state_dir)
    }

    /// Open (creating if needed) the queue database.
    pub fn open_store(&self) -> Result<QueueStore> {
        Ok(QueueStore::open(&self.queue_path())?)
    }

    /// The configured ingest endpoint, required by commands that deliver.
    pub fn ingest_url(&self) -> Result<Url> {
        self.config
            .remote
            .ingest_url()?
            .ok_or_else(|| Error::RemoteNotConfigured(self.config_path.display().to_string()))
    }

    pub fn max_retries(&self) -> u32 {
        self.config.sync.max_retries
    }
}

/// Hold the exclusive sync lock for as long as the returned file lives.
///
/// Two processes delivering from the same queue would break FIFO and could
/// double-deliver, so only one `sync` or `watch` runs per state directory.
pub fn acquire_sync_lock(state_dir: &Path) -> Result<File> {
    fs::create_dir_all(state_dir)?;
    let lock_path = config::lock_path(state_dir);
    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| Error::SyncLocked(lock_path.display().to_string()))?;
    Ok(file)
}

/// Apply `op` to every id, reporting failures without stopping.
///
/// A single id propagates its own error; several ids fail with
/// [`Error::PartialBulkFailure`] if any of them failed.
pub(crate) fn for_each_id(ids: &[String], mut op: impl FnMut(&str) -> Result<()>) -> Result<()> {
    if let [id] = ids {
        return op(id);
    }

    let mut succeeded = 0;
    let mut failed = 0;
    for id in ids {
        match op(id) {
            Ok(()) => succeeded += 1,
            Err(e) => {
                eprintln!("error: {}: {}", id, e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        return Err(Error::PartialBulkFailure { succeeded, failed });
    }
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
