// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Record identifier generation.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::record::MediaKind;

/// Prefix shared by every record id.
pub const ID_PREFIX: &str = "cap";

/// Generate a record ID from project, media kind, and enqueue timestamp.
/// Format: cap-{hash} where hash is first 8 hex chars of SHA256(project + kind + timestamp)
pub fn generate_id(project_id: &str, media_kind: MediaKind, enqueued_at: &DateTime<Utc>) -> String {
    let input = format!(
        "{}{}{}",
        project_id,
        media_kind.as_str(),
        enqueued_at.to_rfc3339_opts(SecondsFormat::Nanos, true)
    );
    let hash = Sha256::digest(input.as_bytes());
    let short_hash = hex::encode(&hash[..4]);
    format!("{}-{}", ID_PREFIX, short_hash)
}

/// Generate a unique ID, handling collisions by appending an incrementing suffix.
///
/// `exists` is consulted for each candidate; lookup failures propagate.
pub fn generate_unique_id<F>(
    project_id: &str,
    media_kind: MediaKind,
    enqueued_at: &DateTime<Utc>,
    mut exists: F,
) -> Result<String>
where
    F: FnMut(&str) -> Result<bool>,
{
    let base_id = generate_id(project_id, media_kind, enqueued_at);

    if !exists(&base_id)? {
        return Ok(base_id);
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id)? {
            return Ok(id);
        }
        suffix += 1;
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
