// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

fn record(status: SyncStatus, retry_count: u32) -> OfflineRecord {
    OfflineRecord {
        id: "cap-00000001".to_string(),
        payload: vec![1, 2, 3],
        metadata: CaptureMetadata::new("site-7", MediaKind::Photo),
        enqueued_at: Utc::now(),
        sync_status: status,
        retry_count,
        last_attempt_at: None,
    }
}

#[parameterized(
    pending = { "pending", SyncStatus::Pending },
    syncing = { "syncing", SyncStatus::Syncing },
    synced = { "synced", SyncStatus::Synced },
    error = { "error", SyncStatus::Error },
    upper = { "PENDING", SyncStatus::Pending },
)]
fn status_from_str_valid(input: &str, expected: SyncStatus) {
    assert_eq!(input.parse::<SyncStatus>().unwrap(), expected);
}

#[parameterized(
    invalid = { "queued" },
    empty = { "" },
)]
fn status_from_str_invalid(input: &str) {
    assert!(input.parse::<SyncStatus>().is_err());
}

#[parameterized(
    claim = { SyncStatus::Pending, SyncStatus::Syncing },
    delivered = { SyncStatus::Syncing, SyncStatus::Synced },
    failed = { SyncStatus::Syncing, SyncStatus::Error },
    recovered = { SyncStatus::Syncing, SyncStatus::Pending },
    retry_claim = { SyncStatus::Error, SyncStatus::Syncing },
    requeue = { SyncStatus::Error, SyncStatus::Pending },
)]
fn status_valid_transitions(from: SyncStatus, to: SyncStatus) {
    assert!(from.can_transition_to(to));
    assert_eq!(from.transition_to(to).unwrap(), to);
}

#[parameterized(
    pending_to_synced = { SyncStatus::Pending, SyncStatus::Synced },
    pending_to_error = { SyncStatus::Pending, SyncStatus::Error },
    pending_to_pending = { SyncStatus::Pending, SyncStatus::Pending },
    synced_to_pending = { SyncStatus::Synced, SyncStatus::Pending },
    synced_to_syncing = { SyncStatus::Synced, SyncStatus::Syncing },
    synced_to_error = { SyncStatus::Synced, SyncStatus::Error },
    error_to_synced = { SyncStatus::Error, SyncStatus::Synced },
    syncing_to_syncing = { SyncStatus::Syncing, SyncStatus::Syncing },
)]
fn status_invalid_transitions(from: SyncStatus, to: SyncStatus) {
    assert!(!from.can_transition_to(to));
    let err = from.transition_to(to).unwrap_err();
    assert!(matches!(err, Error::InvalidTransition { .. }));
}

#[parameterized(
    photo = { "photo", MediaKind::Photo },
    image_alias = { "image", MediaKind::Photo },
    video = { "Video", MediaKind::Video },
    audio = { "audio", MediaKind::Audio },
    doc_alias = { "doc", MediaKind::Document },
)]
fn media_kind_from_str(input: &str, expected: MediaKind) {
    assert_eq!(input.parse::<MediaKind>().unwrap(), expected);
}

#[test]
fn media_kind_invalid() {
    let err = "hologram".parse::<MediaKind>().unwrap_err();
    assert!(matches!(err, Error::InvalidMediaKind(_)));
}

#[parameterized(
    pending = { SyncStatus::Pending, 0, true },
    error_with_budget = { SyncStatus::Error, 2, true },
    error_exhausted = { SyncStatus::Error, 3, false },
    syncing = { SyncStatus::Syncing, 0, false },
    synced = { SyncStatus::Synced, 0, false },
)]
fn record_eligibility(status: SyncStatus, retry_count: u32, eligible: bool) {
    let rec = record(status, retry_count);
    assert_eq!(rec.is_eligible(3), eligible);
}

#[test]
fn exhausted_error_needs_attention() {
    assert!(record(SyncStatus::Error, 3).needs_attention(3));
    assert!(!record(SyncStatus::Error, 1).needs_attention(3));
    assert!(!record(SyncStatus::Pending, 5).needs_attention(3));
}

#[test]
fn filter_matches_status_and_project() {
    let rec = record(SyncStatus::Pending, 0);
    assert!(RecordFilter::all().matches(&rec));
    assert!(RecordFilter::status(SyncStatus::Pending).matches(&rec));
    assert!(!RecordFilter::status(SyncStatus::Synced).matches(&rec));
    assert!(RecordFilter::eligible(3).in_project("site-7").matches(&rec));
    assert!(!RecordFilter::all().in_project("site-8").matches(&rec));
    assert!(!RecordFilter::exhausted(3).matches(&rec));
}

#[test]
fn metadata_json_omits_empty_optionals() {
    let meta = CaptureMetadata::new("site-7", MediaKind::Video);
    let json = serde_json::to_string(&meta).unwrap();
    assert!(json.contains("\"media_kind\":\"video\""));
    assert!(!json.contains("coordinates"));
    assert!(!json.contains("notes"));
}

#[test]
fn metadata_json_accepts_minimal_input() {
    let meta: CaptureMetadata =
        serde_json::from_str(r#"{"project_id":"site-7","media_kind":"photo"}"#).unwrap();
    assert_eq!(meta, CaptureMetadata::new("site-7", MediaKind::Photo));
}
