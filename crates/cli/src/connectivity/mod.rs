// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network reachability tracking.
//!
//! ```text
//! ┌─────────────┐ set_reachable ┌─────────────┐ on_became_reachable ┌──────────────┐
//! │    Probe    │──────────────►│   Monitor   │────────────────────►│ Orchestrator │
//! │ (TCP check) │               │ (debounced) │                     │  (auto-sync) │
//! └─────────────┘               └─────────────┘                     └──────────────┘
//! ```

mod monitor;
mod probe;

pub use monitor::{ConnectivityMonitor, ReachableCallback};
pub use probe::ReachabilityProbe;
