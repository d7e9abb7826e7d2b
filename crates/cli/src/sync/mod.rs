// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline capture delivery.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Orchestrator │────►│  Delivery   │────►│   Ingest    │
//! │ (one pass at │◄────│   (trait)   │◄────│  endpoint   │
//! │   a time)    │     └─────────────┘     └─────────────┘
//! └──────────────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ QueueStore  │  (durable records, sq-core)
//! └─────────────┘
//! ```
//!
//! # Features
//!
//! - Strict FIFO delivery, one record at a time
//! - In-place retry with exponential backoff and a retry budget
//! - Cooperative cancellation at record boundaries
//! - Progress snapshots over a channel
//! - Automatic pass when connectivity settles
//! - Injectable delivery trait for testing

mod delivery;
mod orchestrator;
mod progress;

pub use delivery::{Delivery, DeliveryError, DeliveryResult, HttpDelivery, Receipt};
pub use orchestrator::{backoff_delay, SyncConfig, SyncError, SyncOrchestrator};
pub use progress::{ItemError, PassSummary, StopReason, SyncProgress};

#[cfg(test)]
pub(crate) mod test_helpers;
