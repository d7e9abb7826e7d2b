// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared argument structs for CLI commands.
//!
//! These structs are used with `#[command(flatten)]` to keep the
//! capture metadata flags in one place.

use clap::Args;
use sq_core::MediaKind;

/// Descriptive fields attached to a captured payload.
#[derive(Args, Clone, Debug)]
pub struct CaptureArgs {
    /// Project the capture belongs to
    #[arg(long, short = 'p', value_parser = super::non_empty_string)]
    pub project: String,

    /// Activity classification (e.g. inspection, progress)
    #[arg(long, short = 'a')]
    pub activity: Option<String>,

    /// Free-form location (e.g. "Level 3, east stair")
    #[arg(long)]
    pub location: Option<String>,

    /// Notes to send with the capture
    #[arg(long, short = 'n')]
    pub notes: Option<String>,

    /// Tag(s) (comma-separated or repeated)
    #[arg(long, short = 't', value_delimiter = ',')]
    pub tag: Vec<String>,

    /// Media kind (photo, video, audio, document)
    #[arg(long, short = 'k', default_value = "photo")]
    pub kind: MediaKind,

    /// Latitude in decimal degrees (requires --lon)
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude in decimal degrees (requires --lat)
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,
}
