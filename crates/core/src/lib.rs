// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sq-core: durable offline queue for field captures
//!
//! This crate provides the record model, its delivery state machine, and the
//! SQLite-backed [`QueueStore`] used by the siteq sync engine and CLI.

pub mod error;
pub mod id;
pub mod record;
pub mod store;

pub use error::{Error, Result};
pub use record::{
    CaptureMetadata, Coordinates, MediaKind, OfflineRecord, RecordFilter, StatusScope, SyncStatus,
};
pub use store::QueueStore;
