// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pass progress and summary types.

use serde::Serialize;
use std::fmt;

/// A delivery failure reported for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    pub id: String,
    pub reason: String,
    /// Retry count after this failure.
    pub retry_count: u32,
    /// True when the retry budget is spent and the record awaits a manual requeue.
    pub exhausted: bool,
}

/// Why a pass ended before visiting every eligible record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Cancelled,
    ConnectivityLost,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Cancelled => write!(f, "cancelled"),
            StopReason::ConnectivityLost => write!(f, "connectivity lost"),
        }
    }
}

/// Snapshot sent to progress subscribers during a pass.
///
/// One snapshot follows every processed record (`current_item_id` set to
/// that record); the last snapshot of a pass has `current_item_id = None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncProgress {
    pub total_items: usize,
    pub completed_items: usize,
    pub current_item_id: Option<String>,
    pub errors: Vec<ItemError>,
}

impl SyncProgress {
    /// Returns true for the closing snapshot of a pass.
    pub fn is_final(&self) -> bool {
        self.current_item_id.is_none()
    }
}

/// Outcome of a pass that ran.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PassSummary {
    /// Eligible records at pass start.
    pub total_items: usize,
    /// Records delivered during the pass.
    pub completed_items: usize,
    /// Per-item failures in the order they happened.
    pub errors: Vec<ItemError>,
    /// Set when the pass ended early.
    pub stopped: Option<StopReason>,
}

impl PassSummary {
    pub(crate) fn new(total_items: usize) -> Self {
        PassSummary {
            total_items,
            ..Default::default()
        }
    }

    pub(crate) fn snapshot(&self, current_item_id: Option<&str>) -> SyncProgress {
        SyncProgress {
            total_items: self.total_items,
            completed_items: self.completed_items,
            current_item_id: current_item_id.map(String::from),
            errors: self.errors.clone(),
        }
    }

    /// Records that ran out of retries during this pass.
    pub fn exhausted(&self) -> impl Iterator<Item = &ItemError> {
        self.errors.iter().filter(|e| e.exhausted)
    }
}
