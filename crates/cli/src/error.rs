// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{DeliveryError, SyncError};

/// All possible errors that can occur in the siteq library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("no ingest endpoint configured\n  hint: set [remote] ingest_url in {0}")]
    RemoteNotConfigured(String),

    #[error("invalid ingest url '{url}': {reason}")]
    InvalidIngestUrl { url: String, reason: String },

    #[error("another siteq process is syncing this queue\n  hint: lock held on {0}")]
    SyncLocked(String),

    #[error("{field} cannot be empty")]
    FieldEmpty { field: &'static str },

    #[error("latitude and longitude must be given together")]
    PartialCoordinates,

    #[error("coordinates out of range: {lat}, {lon}\n  hint: latitude is -90..=90, longitude is -180..=180")]
    CoordinatesOutOfRange { lat: f64, lon: f64 },

    #[error("some operations failed: {succeeded} succeeded, {failed} failed")]
    PartialBulkFailure { succeeded: usize, failed: usize },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Queue(#[from] sq_core::Error),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for siteq operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
