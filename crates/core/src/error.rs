// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for sq-core operations.

use rusqlite::ErrorCode;
use thiserror::Error;

/// All possible errors that can occur in sq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("record not found: {0}")]
    NotFound(String),

    /// The backing store cannot be used right now (closed, full, unreadable).
    ///
    /// Nothing about any individual record is implied by this error.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("invalid status transition: cannot go from {from} to {to}\n  hint: from '{from}' you can go to: {valid_targets}")]
    InvalidTransition {
        from: String,
        to: String,
        valid_targets: String,
    },

    #[error("retry count cannot decrease from {current} to {requested} outside of a re-enqueue")]
    InvalidRetryCount { current: u32, requested: u32 },

    #[error("invalid sync status: '{0}'\n  hint: valid statuses are: pending, syncing, synced, error")]
    InvalidStatus(String),

    #[error("invalid media kind: '{0}'\n  hint: valid kinds are: photo, video, audio, document")]
    InvalidMediaKind(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("database error: {0}")]
    Database(rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if the failure concerns the store itself rather than a record.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self, Error::StorageUnavailable(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        let unavailable = match &e {
            rusqlite::Error::SqliteFailure(failure, _) => matches!(
                failure.code,
                ErrorCode::DiskFull
                    | ErrorCode::ReadOnly
                    | ErrorCode::CannotOpen
                    | ErrorCode::SystemIoFailure
                    | ErrorCode::NotADatabase
                    | ErrorCode::DatabaseCorrupt
                    | ErrorCode::PermissionDenied
                    | ErrorCode::OutOfMemory
            ),
            _ => false,
        };
        // Schema missing means the store was never initialized.
        let unavailable = unavailable || e.to_string().contains("no such table");

        if unavailable {
            Error::StorageUnavailable(e.to_string())
        } else {
            Error::Database(e)
        }
    }
}

/// A specialized Result type for sq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
