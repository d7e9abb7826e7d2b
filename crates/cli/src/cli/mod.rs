// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use sq_core::SyncStatus;

pub use args::CaptureArgs;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    #[value(alias = "ids")]
    Id,
}

#[derive(Parser, Debug)]
#[command(name = "siteq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline capture queue for field media")]
#[command(
    long_about = "Offline capture queue for field media.\n\n\
    Captures are stored durably on this device and delivered to the ingest \
    endpoint in the order they were taken, whenever the network allows."
)]
pub struct Cli {
    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the state directory, config file and queue
    #[command(after_help = "\
Examples:
  siteq init --ingest-url https://api.example.com/v1/media")]
    Init {
        /// Media-ingest endpoint to deliver captures to
        #[arg(long, value_name = "URL")]
        ingest_url: Option<String>,
    },

    /// Queue a captured file for delivery
    #[command(after_help = "\
Examples:
  siteq enqueue IMG_0042.jpg -p site-7                 Queue a photo
  siteq enqueue walk.mp4 -p site-7 -k video -a progress
  siteq enqueue - -p site-7 < scan.pdf -k document     Read the payload from stdin
  siteq enqueue IMG_0043.jpg -p site-7 --lat=-33.86 --lon=151.21")]
    Enqueue {
        /// File holding the payload ("-" for stdin)
        file: PathBuf,

        #[command(flatten)]
        capture: CaptureArgs,

        /// Output format (text, json, id)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List queued records in delivery order
    List {
        /// Only records in this status (pending, syncing, synced, error)
        #[arg(long, short = 's', conflicts_with = "attention")]
        status: Option<SyncStatus>,

        /// Only records of this project
        #[arg(long, short = 'p')]
        project: Option<String>,

        /// Only failed records that ran out of retries
        #[arg(long)]
        attention: bool,

        /// Output format (text, json, id)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show queue depth and records needing attention
    Status {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Deliver queued records now
    Sync {
        /// Only print errors
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Return failed record(s) to the queue with a fresh retry budget
    #[command(arg_required_else_help = true)]
    Requeue {
        /// Record ID(s)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete record(s) from the queue
    #[command(arg_required_else_help = true)]
    Remove {
        /// Record ID(s)
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Delete delivered records
    Purge {
        /// Keep records delivered less than this many seconds ago
        #[arg(long, value_name = "SECS")]
        grace_secs: Option<u64>,
    },

    /// Probe the endpoint and deliver whenever connectivity returns
    Watch,

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  siteq completion bash > ~/.local/share/bash-completion/completions/siteq
  siteq completion zsh > ~/.zfunc/_siteq")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
