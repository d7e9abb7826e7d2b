// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `siteq` confined to `state` and isolated from the caller's environment.
pub fn siteq(state: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("siteq");
    cmd.env("SITEQ_STATE_DIR", state)
        .env_remove("SITEQ_CONFIG")
        .env_remove("SITEQ_TOKEN")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create an initialized state directory.
pub fn init_temp(ingest_url: Option<&str>) -> TempDir {
    let temp = TempDir::new().unwrap();
    let mut cmd = siteq(temp.path());
    cmd.arg("init");
    if let Some(url) = ingest_url {
        cmd.arg("--ingest-url").arg(url);
    }
    cmd.assert().success();
    temp
}

/// Write `content` to a capture file inside `temp` and return its path.
pub fn capture_file(temp: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
    let path = temp.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Helper to enqueue a capture and return its ID.
pub fn enqueue(temp: &TempDir, name: &str, project: &str) -> String {
    let file = capture_file(temp, name, name.as_bytes());
    let output = siteq(temp.path())
        .arg("enqueue")
        .arg(&file)
        .args(["-p", project, "-o", "id"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A `host:port` URL nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/v1/media")
}
