// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable queue of capture records.
//!
//! [`QueueStore`] is the only component that touches persistent state. Every
//! mutation is a single statement or a single transaction executed while the
//! connection mutex is held, so concurrent callers never observe a torn record.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, Transaction};

use crate::error::{Error, Result};
use crate::id::generate_unique_id;
use crate::record::{
    CaptureMetadata, Coordinates, OfflineRecord, RecordFilter, StatusScope, SyncStatus,
};

/// SQL schema for the offline queue.
pub const SCHEMA: &str = r#"
-- One row per queued capture; seq breaks enqueued_at ties so FIFO is total
CREATE TABLE IF NOT EXISTS records (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    payload BLOB NOT NULL,
    project_id TEXT NOT NULL,
    activity_type TEXT,
    location TEXT,
    notes TEXT,
    tags TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    media_kind TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    enqueued_at TEXT NOT NULL,
    sync_status TEXT NOT NULL DEFAULT 'pending',
    retry_count INTEGER NOT NULL DEFAULT 0,
    last_attempt_at TEXT,
    CHECK (retry_count >= 0),
    CHECK ((latitude IS NULL) = (longitude IS NULL))
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_records_status ON records(sync_status);
CREATE INDEX IF NOT EXISTS idx_records_project ON records(project_id);
CREATE INDEX IF NOT EXISTS idx_records_order ON records(enqueued_at, seq);
"#;

const SELECT_COLUMNS: &str = "SELECT id, payload, project_id, activity_type, location, notes,
        tags, media_kind, latitude, longitude, enqueued_at, sync_status,
        retry_count, last_attempt_at
 FROM records";

/// Run schema creation on a database connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Format a timestamp so that text order equals chronological order.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn corrupted(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(Error::CorruptedData(message)),
    )
}

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value
        .parse()
        .map_err(|_| corrupted(format!("invalid value '{value}' in column '{column}'")))
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupted(format!("invalid timestamp '{value}' in column '{column}'")))
}

fn parse_retry_count(value: i64) -> std::result::Result<u32, rusqlite::Error> {
    u32::try_from(value).map_err(|_| corrupted(format!("invalid retry_count {value}")))
}

fn row_to_record(row: &Row<'_>) -> std::result::Result<OfflineRecord, rusqlite::Error> {
    let tags_json: String = row.get(6)?;
    let kind_str: String = row.get(7)?;
    let latitude: Option<f64> = row.get(8)?;
    let longitude: Option<f64> = row.get(9)?;
    let enqueued_str: String = row.get(10)?;
    let status_str: String = row.get(11)?;
    let retry_count: i64 = row.get(12)?;
    let last_attempt: Option<String> = row.get(13)?;

    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|_| corrupted(format!("invalid tags '{tags_json}'")))?;
    let coordinates = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinates {
            latitude,
            longitude,
        }),
        _ => None,
    };

    Ok(OfflineRecord {
        id: row.get(0)?,
        payload: row.get(1)?,
        metadata: CaptureMetadata {
            project_id: row.get(2)?,
            activity_type: row.get(3)?,
            location: row.get(4)?,
            notes: row.get(5)?,
            tags,
            media_kind: parse_db(&kind_str, "media_kind")?,
            coordinates,
        },
        enqueued_at: parse_timestamp(&enqueued_str, "enqueued_at")?,
        sync_status: parse_db(&status_str, "sync_status")?,
        retry_count: parse_retry_count(retry_count)?,
        last_attempt_at: last_attempt
            .map(|s| parse_timestamp(&s, "last_attempt_at"))
            .transpose()?,
    })
}

/// Build a WHERE clause (possibly empty) and its positional parameters.
fn where_clause(filter: &RecordFilter) -> (String, Vec<Value>) {
    let mut conditions = Vec::new();
    let mut values = Vec::new();

    match filter.status {
        StatusScope::All => {}
        StatusScope::Only(status) => {
            conditions.push("sync_status = ?".to_string());
            values.push(Value::Text(status.as_str().to_string()));
        }
        StatusScope::Eligible { max_retries } => {
            conditions.push(
                "(sync_status = 'pending' OR (sync_status = 'error' AND retry_count < ?))"
                    .to_string(),
            );
            values.push(Value::Integer(i64::from(max_retries)));
        }
        StatusScope::Exhausted { max_retries } => {
            conditions.push("(sync_status = 'error' AND retry_count >= ?)".to_string());
            values.push(Value::Integer(i64::from(max_retries)));
        }
    }

    if let Some(project_id) = &filter.project_id {
        conditions.push("project_id = ?".to_string());
        values.push(Value::Text(project_id.clone()));
    }

    if conditions.is_empty() {
        (String::new(), values)
    } else {
        (format!(" WHERE {}", conditions.join(" AND ")), values)
    }
}

fn record_exists(conn: &Connection, id: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM records WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Read-validate-write of one record's status inside an open transaction.
fn apply_transition(
    tx: &Transaction<'_>,
    id: &str,
    target: SyncStatus,
    retry_count_override: Option<u32>,
    require_from: Option<SyncStatus>,
) -> Result<()> {
    let current = tx
        .query_row(
            "SELECT sync_status, retry_count FROM records WHERE id = ?1",
            params![id],
            |row| {
                let status: String = row.get(0)?;
                let retry: i64 = row.get(1)?;
                Ok((parse_db::<SyncStatus>(&status, "sync_status")?, parse_retry_count(retry)?))
            },
        )
        .optional()?;
    let (current_status, current_retry) = current.ok_or_else(|| Error::NotFound(id.to_string()))?;

    if let Some(required) = require_from {
        if current_status != required {
            return Err(Error::InvalidTransition {
                from: current_status.as_str().to_string(),
                to: target.as_str().to_string(),
                valid_targets: current_status.valid_targets(),
            });
        }
    }
    current_status.transition_to(target)?;

    let is_requeue = current_status == SyncStatus::Error && target == SyncStatus::Pending;
    let retry_count = match retry_count_override {
        Some(requested) if requested < current_retry && !is_requeue => {
            return Err(Error::InvalidRetryCount {
                current: current_retry,
                requested,
            });
        }
        Some(requested) => requested,
        None => current_retry,
    };

    tx.execute(
        "UPDATE records SET sync_status = ?1, retry_count = ?2, last_attempt_at = ?3
         WHERE id = ?4",
        params![
            target.as_str(),
            i64::from(retry_count),
            format_timestamp(&Utc::now()),
            id
        ],
    )?;
    Ok(())
}

/// Durable, indexed queue of [`OfflineRecord`]s.
pub struct QueueStore {
    /// The underlying SQLite connection; `None` once the store is closed.
    conn: Mutex<Option<Connection>>,
    /// Backing file, if not in-memory.
    path: Option<PathBuf>,
}

impl QueueStore {
    /// Open a queue at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL for concurrent readers, FULL sync so a committed enqueue survives power loss
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;
        run_migrations(&conn)?;

        tracing::debug!(path = %path.display(), "opened queue store");
        Ok(QueueStore {
            conn: Mutex::new(Some(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory queue (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(QueueStore {
            conn: Mutex::new(Some(conn)),
            path: None,
        })
    }

    /// Path of the backing database file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>> {
        self.conn
            .lock()
            .map_err(|_| Error::StorageUnavailable("queue store lock poisoned".to_string()))
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.lock()?;
        let conn = guard
            .as_mut()
            .ok_or_else(|| Error::StorageUnavailable("queue store is closed".to_string()))?;
        f(conn)
    }

    /// Returns true until [`close`](Self::close) has been called.
    pub fn is_open(&self) -> bool {
        self.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    /// Close the store. Every later call fails with [`Error::StorageUnavailable`].
    pub fn close(&self) -> Result<()> {
        let conn = self.lock()?.take();
        if let Some(conn) = conn {
            conn.close().map_err(|(_, e)| Error::from(e))?;
            tracing::debug!("closed queue store");
        }
        Ok(())
    }

    /// Queue a captured payload. Returns the new record's id.
    ///
    /// The record starts `pending` with `retry_count = 0`.
    pub fn enqueue(&self, payload: &[u8], metadata: &CaptureMetadata) -> Result<String> {
        let enqueued_at = Utc::now();
        let tags = serde_json::to_string(&metadata.tags)?;

        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let id = generate_unique_id(
                &metadata.project_id,
                metadata.media_kind,
                &enqueued_at,
                |candidate| record_exists(&tx, candidate),
            )?;

            tx.execute(
                "INSERT INTO records (id, payload, project_id, activity_type, location, notes,
                 tags, media_kind, latitude, longitude, enqueued_at, sync_status, retry_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 0)",
                params![
                    id,
                    payload,
                    metadata.project_id,
                    metadata.activity_type,
                    metadata.location,
                    metadata.notes,
                    tags,
                    metadata.media_kind.as_str(),
                    metadata.coordinates.map(|c| c.latitude),
                    metadata.coordinates.map(|c| c.longitude),
                    format_timestamp(&enqueued_at),
                    SyncStatus::Pending.as_str(),
                ],
            )?;
            tx.commit()?;

            tracing::debug!(id = %id, project = %metadata.project_id, bytes = payload.len(), "enqueued record");
            Ok(id)
        })
    }

    /// Get a record by ID.
    pub fn get(&self, id: &str) -> Result<OfflineRecord> {
        self.with_conn(|conn| {
            let record = conn
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                    params![id],
                    row_to_record,
                )
                .optional()?;
            record.ok_or_else(|| Error::NotFound(id.to_string()))
        })
    }

    /// List records matching the filter, oldest enqueue first.
    ///
    /// A single statement under the connection lock, so the result is a
    /// consistent snapshot.
    pub fn list(&self, filter: &RecordFilter) -> Result<Vec<OfflineRecord>> {
        let (clause, values) = where_clause(filter);
        let sql = format!("{SELECT_COLUMNS}{clause} ORDER BY enqueued_at ASC, seq ASC");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let records = stmt
                .query_map(params_from_iter(values.iter()), row_to_record)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(records)
        })
    }

    /// Count records matching the filter without reading payloads.
    pub fn count(&self, filter: &RecordFilter) -> Result<usize> {
        let (clause, values) = where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM records{clause}");

        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
            Ok(usize::try_from(count).unwrap_or(0))
        })
    }

    /// Move a record to `status`, stamping `last_attempt_at = now`.
    ///
    /// The transition must be allowed by [`SyncStatus::can_transition_to`].
    /// `retry_count_override` replaces the stored retry count; it may only
    /// go down on an `error -> pending` re-enqueue.
    pub fn update_status(
        &self,
        id: &str,
        status: SyncStatus,
        retry_count_override: Option<u32>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            apply_transition(&tx, id, status, retry_count_override, None)?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Re-enqueue a failed record: `error -> pending` with `retry_count = 0`.
    pub fn requeue(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            apply_transition(&tx, id, SyncStatus::Pending, Some(0), Some(SyncStatus::Error))?;
            tx.commit()?;
            tracing::info!(id = %id, "re-enqueued record");
            Ok(())
        })
    }

    /// Permanently delete a record. Removing an absent id is not an error.
    ///
    /// Returns whether a record was deleted.
    pub fn remove(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM records WHERE id = ?1", params![id])?;
            Ok(affected > 0)
        })
    }

    /// Delete `synced` records whose last attempt is at least `grace` old.
    ///
    /// Returns the number of records removed; a second call on the same set
    /// removes nothing.
    pub fn purge_synced(&self, grace: Duration) -> Result<usize> {
        let grace = TimeDelta::from_std(grace).unwrap_or(TimeDelta::MAX);
        let Some(cutoff) = Utc::now().checked_sub_signed(grace) else {
            return Ok(0);
        };

        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM records WHERE sync_status = 'synced' AND last_attempt_at <= ?1",
                params![format_timestamp(&cutoff)],
            )?;
            if removed > 0 {
                tracing::debug!(removed, "purged synced records");
            }
            Ok(removed)
        })
    }

    /// Return records stranded in `syncing` (crash or aborted pass) to `pending`.
    ///
    /// Retry counts are untouched: an interrupted attempt is not a failure.
    pub fn recover_interrupted(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let recovered = conn.execute(
                "UPDATE records SET sync_status = 'pending' WHERE sync_status = 'syncing'",
                [],
            )?;
            if recovered > 0 {
                tracing::warn!(recovered, "recovered interrupted deliveries");
            }
            Ok(recovered)
        })
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
