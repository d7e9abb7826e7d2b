// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queued capture records and their delivery lifecycle.
//!
//! An [`OfflineRecord`] is one captured payload waiting to be delivered. Its
//! [`SyncStatus`] moves through a fixed state machine:
//!
//! ```text
//! pending ──► syncing ──► synced            (terminal)
//!    ▲           │
//!    │           ▼
//!    └──────── error ──► syncing           (while retries remain)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Delivery status of a queued record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Waiting for the next pass. Initial state for new records.
    Pending,
    /// Claimed by the orchestrator; delivery in flight.
    Syncing,
    /// Delivered. Never attempted again.
    Synced,
    /// Last attempt failed. Retryable while the retry budget lasts.
    Error,
}

impl SyncStatus {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Syncing => "syncing",
            SyncStatus::Synced => "synced",
            SyncStatus::Error => "error",
        }
    }

    /// Check if a transition from this status to target is valid.
    ///
    /// `syncing -> pending` only happens when an interrupted delivery is
    /// recovered; `error -> pending` is the explicit re-enqueue.
    pub fn can_transition_to(&self, target: SyncStatus) -> bool {
        use SyncStatus::*;
        matches!(
            (self, target),
            (Pending, Syncing)
                | (Syncing, Synced)
                | (Syncing, Error)
                | (Syncing, Pending)
                | (Error, Syncing)
                | (Error, Pending)
        )
    }

    /// Get valid transition targets as a formatted string.
    pub fn valid_targets(&self) -> String {
        match self {
            SyncStatus::Pending => "syncing".to_string(),
            SyncStatus::Syncing => "synced, error, pending".to_string(),
            SyncStatus::Synced => "(none, synced is terminal)".to_string(),
            SyncStatus::Error => "syncing, pending (re-enqueue)".to_string(),
        }
    }

    /// Validate a transition, returning the target on success.
    pub fn transition_to(&self, target: SyncStatus) -> Result<SyncStatus> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(Error::InvalidTransition {
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
                valid_targets: self.valid_targets(),
            })
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(SyncStatus::Pending),
            "syncing" => Ok(SyncStatus::Syncing),
            "synced" => Ok(SyncStatus::Synced),
            "error" => Ok(SyncStatus::Error),
            _ => Err(Error::InvalidStatus(s.to_string())),
        }
    }
}

/// What kind of media the payload holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
    Audio,
    Document,
}

impl MediaKind {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Document => "document",
        }
    }

    /// MIME type sent alongside the payload.
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaKind::Photo => "image/jpeg",
            MediaKind::Video => "video/mp4",
            MediaKind::Audio => "audio/mp4",
            MediaKind::Document => "application/octet-stream",
        }
    }

    /// File extension used when naming the uploaded payload.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Photo => "jpg",
            MediaKind::Video => "mp4",
            MediaKind::Audio => "m4a",
            MediaKind::Document => "bin",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "photo" | "image" => Ok(MediaKind::Photo),
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            "document" | "doc" => Ok(MediaKind::Document),
            _ => Err(Error::InvalidMediaKind(s.to_string())),
        }
    }
}

/// Geographic position of a capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Descriptive fields supplied by the capture side, carried through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureMetadata {
    /// Owning project on the remote service.
    pub project_id: String,
    /// Activity classification (e.g. "inspection", "progress").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub media_kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl CaptureMetadata {
    /// Metadata with only the required fields set.
    pub fn new(project_id: impl Into<String>, media_kind: MediaKind) -> Self {
        CaptureMetadata {
            project_id: project_id.into(),
            activity_type: None,
            location: None,
            notes: None,
            tags: Vec::new(),
            media_kind,
            coordinates: None,
        }
    }
}

/// One queued unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineRecord {
    /// Unique identifier (format: `cap-{hash}`), immutable.
    pub id: String,
    /// Opaque captured bytes.
    pub payload: Vec<u8>,
    pub metadata: CaptureMetadata,
    /// Set once at enqueue; defines delivery order.
    pub enqueued_at: DateTime<Utc>,
    pub sync_status: SyncStatus,
    /// Number of failed delivery attempts.
    pub retry_count: u32,
    /// Most recent status change made by a delivery attempt or re-enqueue.
    pub last_attempt_at: Option<DateTime<Utc>>,
}

impl OfflineRecord {
    /// Returns true if a pass may claim this record.
    pub fn is_eligible(&self, max_retries: u32) -> bool {
        match self.sync_status {
            SyncStatus::Pending => true,
            SyncStatus::Error => self.retry_count < max_retries,
            SyncStatus::Syncing | SyncStatus::Synced => false,
        }
    }

    /// Returns true if the record failed and has no retries left.
    pub fn needs_attention(&self, max_retries: u32) -> bool {
        self.sync_status == SyncStatus::Error && self.retry_count >= max_retries
    }
}

/// Which statuses a [`RecordFilter`] selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusScope {
    /// Every record.
    #[default]
    All,
    /// Records in exactly this status.
    Only(SyncStatus),
    /// Pending records plus errors with `retry_count < max_retries`.
    Eligible { max_retries: u32 },
    /// Errors with `retry_count >= max_retries`.
    Exhausted { max_retries: u32 },
}

/// Selection criteria for listing and counting records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordFilter {
    pub status: StatusScope,
    pub project_id: Option<String>,
}

impl RecordFilter {
    /// Matches every record.
    pub fn all() -> Self {
        RecordFilter::default()
    }

    /// Matches records in the given status.
    pub fn status(status: SyncStatus) -> Self {
        RecordFilter {
            status: StatusScope::Only(status),
            project_id: None,
        }
    }

    /// Matches records a pass may claim.
    pub fn eligible(max_retries: u32) -> Self {
        RecordFilter {
            status: StatusScope::Eligible { max_retries },
            project_id: None,
        }
    }

    /// Matches terminal errors awaiting a manual re-enqueue.
    pub fn exhausted(max_retries: u32) -> Self {
        RecordFilter {
            status: StatusScope::Exhausted { max_retries },
            project_id: None,
        }
    }

    /// Restrict to one owning project.
    pub fn in_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Returns true if the record satisfies this filter.
    pub fn matches(&self, record: &OfflineRecord) -> bool {
        let status_ok = match self.status {
            StatusScope::All => true,
            StatusScope::Only(status) => record.sync_status == status,
            StatusScope::Eligible { max_retries } => record.is_eligible(max_retries),
            StatusScope::Exhausted { max_retries } => record.needs_attention(max_retries),
        };
        let project_ok = self
            .project_id
            .as_deref()
            .is_none_or(|p| p == record.metadata.project_id);
        status_ok && project_ok
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
