// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Human and JSON renderings of queued records and pass results.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sq_core::{CaptureMetadata, MediaKind, OfflineRecord, SyncStatus};

use crate::sync::{ItemError, PassSummary};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a byte count the way people read file sizes.
pub fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// One-line summary of a record.
///
/// Format: `cap-0a1b2c3d  pending  photo  site-7  2026-10-19 08:15:02  1.2 MB`,
/// followed by the retry tally for failed records.
pub fn format_record_line(record: &OfflineRecord, max_retries: u32) -> String {
    let mut line = format!(
        "{}  {:<7}  {:<8}  {}  {}  {}",
        record.id,
        record.sync_status.as_str(),
        record.metadata.media_kind.as_str(),
        record.metadata.project_id,
        record.enqueued_at.format(TIMESTAMP_FORMAT),
        format_size(record.payload.len()),
    );
    if record.needs_attention(max_retries) {
        line.push_str(&format!(
            "  (failed {}/{}, needs requeue)",
            record.retry_count, max_retries
        ));
    } else if record.retry_count > 0 {
        line.push_str(&format!("  (retry {}/{})", record.retry_count, max_retries));
    }
    line
}

/// Line describing one failed delivery in a pass.
pub fn format_item_error(error: &ItemError) -> String {
    if error.exhausted {
        format!(
            "{}: {} (gave up after {} attempts, use `siteq requeue {}`)",
            error.id, error.reason, error.retry_count, error.id
        )
    } else {
        format!(
            "{}: {} (attempt {}, will retry)",
            error.id, error.reason, error.retry_count
        )
    }
}

/// Closing line of a pass.
pub fn format_pass_summary(summary: &PassSummary) -> String {
    let mut line = if summary.total_items == 0 {
        "Nothing to sync".to_string()
    } else {
        format!(
            "Synced {} of {} record(s)",
            summary.completed_items, summary.total_items
        )
    };
    if let Some(reason) = summary.stopped {
        line.push_str(&format!(" (stopped: {})", reason));
    }
    line
}

/// JSON view of a record. The payload itself is reported by size only.
#[derive(Debug, Serialize)]
pub struct RecordJson<'a> {
    pub id: &'a str,
    pub sync_status: SyncStatus,
    pub retry_count: u32,
    pub needs_attention: bool,
    pub enqueued_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub size_bytes: usize,
    pub media_kind: MediaKind,
    pub metadata: &'a CaptureMetadata,
}

impl<'a> RecordJson<'a> {
    pub fn new(record: &'a OfflineRecord, max_retries: u32) -> Self {
        RecordJson {
            id: &record.id,
            sync_status: record.sync_status,
            retry_count: record.retry_count,
            needs_attention: record.needs_attention(max_retries),
            enqueued_at: record.enqueued_at,
            last_attempt_at: record.last_attempt_at,
            size_bytes: record.payload.len(),
            media_kind: record.metadata.media_kind,
            metadata: &record.metadata,
        }
    }
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
