// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::io::Read;
use std::path::Path;

use sq_core::{CaptureMetadata, Coordinates, QueueStore};

use crate::cli::{CaptureArgs, OutputFormat};
use crate::display::{format_record_line, format_size, RecordJson};
use crate::error::{Error, Result};

use super::Context;

pub fn run(ctx: &Context, file: &Path, capture: CaptureArgs, output: OutputFormat) -> Result<()> {
    let payload = read_payload(file)?;
    let metadata = build_metadata(capture)?;
    let store = ctx.open_store()?;
    let id = enqueue_impl(&store, &payload, &metadata)?;

    match output {
        OutputFormat::Id => println!("{}", id),
        OutputFormat::Json => {
            let record = store.get(&id)?;
            println!(
                "{}",
                serde_json::to_string(&RecordJson::new(&record, ctx.max_retries()))?
            );
        }
        OutputFormat::Text => {
            let record = store.get(&id)?;
            println!(
                "Queued {} ({})",
                id,
                format_size(record.payload.len())
            );
            println!("  {}", format_record_line(&record, ctx.max_retries()));
        }
    }
    Ok(())
}

/// Persist one capture. The record is durable once this returns.
pub(crate) fn enqueue_impl(
    store: &QueueStore,
    payload: &[u8],
    metadata: &CaptureMetadata,
) -> Result<String> {
    if payload.is_empty() {
        return Err(Error::FieldEmpty { field: "payload" });
    }
    let id = store.enqueue(payload, metadata)?;
    tracing::info!(id = %id, project = %metadata.project_id, bytes = payload.len(), "queued capture");
    Ok(id)
}

/// Read the payload from `file`, or stdin for `-`.
fn read_payload(file: &Path) -> Result<Vec<u8>> {
    if file == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        Ok(buf)
    } else {
        Ok(std::fs::read(file)?)
    }
}

/// Trim an optional free-text field, dropping it when blank.
fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate CLI capture flags into record metadata.
pub(crate) fn build_metadata(capture: CaptureArgs) -> Result<CaptureMetadata> {
    let project_id = capture.project.trim().to_string();
    if project_id.is_empty() {
        return Err(Error::FieldEmpty { field: "project" });
    }

    let coordinates = match (capture.lat, capture.lon) {
        (None, None) => None,
        (Some(lat), Some(lon)) => {
            if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
                return Err(Error::CoordinatesOutOfRange { lat, lon });
            }
            Some(Coordinates {
                latitude: lat,
                longitude: lon,
            })
        }
        _ => return Err(Error::PartialCoordinates),
    };

    let mut tags: Vec<String> = Vec::new();
    for tag in capture.tag {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    Ok(CaptureMetadata {
        project_id,
        activity_type: optional_text(capture.activity),
        location: optional_text(capture.location),
        notes: optional_text(capture.notes),
        tags,
        media_kind: capture.kind,
        coordinates,
    })
}

#[cfg(test)]
#[path = "enqueue_tests.rs"]
mod tests;
