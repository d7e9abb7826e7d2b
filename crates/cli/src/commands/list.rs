// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sq_core::{OfflineRecord, QueueStore, RecordFilter, SyncStatus};

use crate::cli::OutputFormat;
use crate::display::{format_record_line, RecordJson};
use crate::error::Result;

use super::Context;

pub fn run(
    ctx: &Context,
    status: Option<SyncStatus>,
    project: Option<String>,
    attention: bool,
    output: OutputFormat,
) -> Result<()> {
    let store = ctx.open_store()?;
    let max_retries = ctx.max_retries();
    let records = list_impl(&store, status, project, attention, max_retries)?;

    match output {
        OutputFormat::Text => {
            if records.is_empty() {
                println!("Queue is empty");
            }
            for record in &records {
                println!("{}", format_record_line(record, max_retries));
            }
        }
        OutputFormat::Id => {
            for record in &records {
                println!("{}", record.id);
            }
        }
        OutputFormat::Json => {
            let json: Vec<RecordJson<'_>> = records
                .iter()
                .map(|r| RecordJson::new(r, max_retries))
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

/// Records matching the flags, oldest first.
pub(crate) fn list_impl(
    store: &QueueStore,
    status: Option<SyncStatus>,
    project: Option<String>,
    attention: bool,
    max_retries: u32,
) -> Result<Vec<OfflineRecord>> {
    let mut filter = match (attention, status) {
        (true, _) => RecordFilter::exhausted(max_retries),
        (false, Some(status)) => RecordFilter::status(status),
        (false, None) => RecordFilter::all(),
    };
    if let Some(project) = project {
        filter = filter.in_project(project);
    }
    Ok(store.list(&filter)?)
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
