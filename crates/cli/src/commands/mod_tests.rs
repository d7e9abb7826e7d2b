// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::TempDir;

fn context(temp: &TempDir) -> Context {
    Context::load_from(temp.path().to_path_buf(), None).unwrap()
}

#[test]
fn load_without_config_file_uses_defaults() {
    let temp = TempDir::new().unwrap();
    let ctx = Context::load_from(temp.path().to_path_buf(), None).unwrap();

    assert_eq!(ctx.config, Config::default());
    assert_eq!(ctx.config_path, temp.path().join("config.toml"));
    assert_eq!(ctx.queue_path(), temp.path().join("queue.db"));
}

#[test]
fn explicit_config_resolves_relative_queue_path() {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join("etc");
    let config_path = config_dir.join("siteq.toml");
    let mut config = Config::default();
    config.queue.path = Some(PathBuf::from("queue/captures.db"));
    config.save(&config_path).unwrap();

    let ctx = Context::load_from(temp.path().join("state"), Some(&config_path)).unwrap();

    assert_eq!(ctx.queue_path(), config_dir.join("queue/captures.db"));
}

#[test]
fn open_store_creates_database() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp);

    let store = ctx.open_store().unwrap();

    assert!(store.is_open());
    assert!(temp.path().join("queue.db").exists());
}

#[test]
fn ingest_url_required() {
    let temp = TempDir::new().unwrap();
    let ctx = context(&temp);

    assert!(matches!(ctx.ingest_url(), Err(Error::RemoteNotConfigured(_))));
}

#[test]
fn ingest_url_from_config() {
    let temp = TempDir::new().unwrap();
    let mut ctx = context(&temp);
    ctx.config.remote.ingest_url = Some("https://api.example.com/v1/media".to_string());

    assert_eq!(
        ctx.ingest_url().unwrap().as_str(),
        "https://api.example.com/v1/media"
    );
}

#[test]
fn sync_lock_is_exclusive() {
    let temp = TempDir::new().unwrap();

    let held = acquire_sync_lock(temp.path()).unwrap();
    let second = acquire_sync_lock(temp.path());
    assert!(matches!(second, Err(Error::SyncLocked(_))));

    drop(held);
    assert!(acquire_sync_lock(temp.path()).is_ok());
}

#[test]
fn for_each_id_single_propagates_error() {
    let ids = vec!["cap-1".to_string()];
    let result = for_each_id(&ids, |id| Err(sq_core::Error::NotFound(id.to_string()).into()));

    assert!(matches!(
        result,
        Err(Error::Queue(sq_core::Error::NotFound(_)))
    ));
}

#[test]
fn for_each_id_continues_past_failures() {
    let ids: Vec<String> = ["cap-1", "cap-2", "cap-3"].iter().map(|s| s.to_string()).collect();
    let mut visited = Vec::new();

    let result = for_each_id(&ids, |id| {
        visited.push(id.to_string());
        if id == "cap-2" {
            Err(sq_core::Error::NotFound(id.to_string()).into())
        } else {
            Ok(())
        }
    });

    assert_eq!(visited, ids);
    assert!(matches!(
        result,
        Err(Error::PartialBulkFailure {
            succeeded: 2,
            failed: 1
        })
    ));
}

#[test]
fn for_each_id_all_succeed() {
    let ids = vec!["cap-1".to_string(), "cap-2".to_string()];
    assert!(for_each_id(&ids, |_| Ok(())).is_ok());
}
