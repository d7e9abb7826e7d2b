// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;
use yare::parameterized;

#[test]
fn missing_file_yields_defaults() {
    let temp = TempDir::new().unwrap();
    let config = Config::load(&temp.path().join("config.toml")).unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.sync.max_retries, 3);
    assert_eq!(config.sync.base_delay_ms, 1000);
    assert_eq!(config.sync.max_delay_secs, 30);
    assert_eq!(config.sync.delivery_timeout_secs, 60);
    assert_eq!(config.sync.purge_grace_secs, 5);
    assert!(config.sync.backoff_after_final_failure);
    assert_eq!(config.connectivity.quiet_period_ms, 3000);
    assert!(config.remote.ingest_url.is_none());
}

#[test]
fn partial_file_fills_in_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(
        &path,
        "[sync]\nmax_retries = 5\n\n[remote]\ningest_url = \"https://api.example.com/v1/media\"\n",
    )
    .unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.sync.max_retries, 5);
    assert_eq!(config.sync.base_delay_ms, 1000);
    assert_eq!(config.connectivity, ConnectivityConfig::default());
    assert_eq!(
        config.remote.ingest_url.as_deref(),
        Some("https://api.example.com/v1/media")
    );
}

#[test]
fn save_then_load_preserves_values() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("config.toml");
    let mut config = Config::default();
    config.sync.backoff_after_final_failure = false;
    config.connectivity.quiet_period_ms = 250;
    config.queue.path = Some(PathBuf::from("data/queue.db"));

    config.save(&path).unwrap();
    let loaded = Config::load(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn malformed_file_is_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[sync\nmax_retries = ").unwrap();

    let err = Config::load(&path).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("failed to parse config"));
}

#[test]
fn wrong_type_is_config_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, "[sync]\nmax_retries = \"three\"\n").unwrap();

    assert!(matches!(Config::load(&path), Err(Error::Config(_))));
}

#[test]
fn sync_section_converts_to_orchestrator_policy() {
    let section = SyncSection {
        max_retries: 4,
        base_delay_ms: 250,
        max_delay_secs: 10,
        delivery_timeout_secs: 20,
        purge_grace_secs: 0,
        backoff_after_final_failure: false,
    };

    let policy = section.to_sync_config();

    assert_eq!(policy.max_retries, 4);
    assert_eq!(policy.base_delay, Duration::from_millis(250));
    assert_eq!(policy.max_delay, Duration::from_secs(10));
    assert_eq!(policy.delivery_timeout, Duration::from_secs(20));
    assert_eq!(policy.purge_grace, Duration::ZERO);
    assert!(!policy.backoff_after_final_failure);
}

#[test]
fn default_sync_section_matches_default_policy() {
    assert_eq!(SyncSection::default().to_sync_config(), SyncConfig::default());
}

#[test]
fn connectivity_durations() {
    let connectivity = ConnectivityConfig::default();
    assert_eq!(connectivity.quiet_period(), Duration::from_secs(3));
    assert_eq!(connectivity.probe_interval(), Duration::from_secs(5));
    assert_eq!(connectivity.probe_timeout(), Duration::from_secs(2));
}

#[test]
fn ingest_url_absent() {
    assert!(RemoteConfig::default().ingest_url().unwrap().is_none());
}

#[parameterized(
    https = { "https://api.example.com/v1/media" },
    http_with_port = { "http://127.0.0.1:8080/ingest" },
)]
fn ingest_url_valid(raw: &str) {
    let remote = RemoteConfig {
        ingest_url: Some(raw.to_string()),
    };
    let url = remote.ingest_url().unwrap().unwrap();
    assert_eq!(url.as_str(), raw);
}

#[parameterized(
    not_a_url = { "not a url" },
    ftp = { "ftp://files.example.com/drop" },
    relative = { "/v1/media" },
)]
fn ingest_url_invalid(raw: &str) {
    let remote = RemoteConfig {
        ingest_url: Some(raw.to_string()),
    };
    assert!(matches!(
        remote.ingest_url(),
        Err(Error::InvalidIngestUrl { .. })
    ));
}

#[test]
fn queue_path_defaults_to_state_dir() {
    let config = Config::default();
    let path = config.queue_path(Path::new("/etc/siteq"), Path::new("/var/lib/siteq"));
    assert_eq!(path, PathBuf::from("/var/lib/siteq/queue.db"));
}

#[test]
fn queue_path_relative_resolves_against_config_dir() {
    let mut config = Config::default();
    config.queue.path = Some(PathBuf::from("data/queue.db"));
    let path = config.queue_path(Path::new("/etc/siteq"), Path::new("/var/lib/siteq"));
    assert_eq!(path, PathBuf::from("/etc/siteq/data/queue.db"));
}

#[test]
fn queue_path_absolute_is_kept() {
    let mut config = Config::default();
    config.queue.path = Some(PathBuf::from("/mnt/card/queue.db"));
    let path = config.queue_path(Path::new("/etc/siteq"), Path::new("/var/lib/siteq"));
    assert_eq!(path, PathBuf::from("/mnt/card/queue.db"));
}

#[test]
fn explicit_config_path_wins() {
    let path = config_path(Some(Path::new("/tmp/custom.toml")), Path::new("/state"));
    assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
}

#[test]
fn state_file_locations() {
    let state = Path::new("/state");
    assert_eq!(lock_path(state), PathBuf::from("/state/sync.lock"));
    assert_eq!(log_path(state), PathBuf::from("/state/siteq.log"));
}
