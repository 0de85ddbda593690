// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Basic CLI tests - help, version, and the offline queue round trip

// Allow deprecated - cargo_bin is standard for CLI testing
#![allow(deprecated)]
// Allow expect/unwrap in tests - they provide clear panic messages on failure
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::net::TcpListener;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A base URL nothing is listening on
fn unreachable_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}

fn ticketq_cmd(data_dir: &TempDir, base_url: &str) -> Command {
    let mut cmd = Command::cargo_bin("ticketq").expect("Failed to find ticketq binary");
    cmd.env_remove("RUST_LOG")
        .env("TICKETQ_DATA_DIR", data_dir.path())
        .env("TICKETQ_BASE_URL", base_url)
        .env("TICKETQ_HTTP_TIMEOUT_SECS", "5");
    cmd
}

#[test]
fn test_ticketq_version() {
    Command::cargo_bin("ticketq")
        .expect("Failed to find ticketq binary")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ticketq"));
}

#[test]
fn test_ticketq_help() {
    Command::cargo_bin("ticketq")
        .expect("Failed to find ticketq binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("submit"))
        .stdout(predicate::str::contains("drain"))
        .stdout(predicate::str::contains("fetch"));
}

#[test]
fn test_empty_queue_lists_nothing() {
    let dir = TempDir::new().unwrap();
    ticketq_cmd(&dir, &unreachable_base())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No queued writes"));
}

#[test]
fn test_submit_offline_queues_then_list_and_clear() {
    let dir = TempDir::new().unwrap();
    let base = unreachable_base();

    ticketq_cmd(&dir, &base)
        .args(["submit", "/api/tickets", r#"{"title": "VPN", "description": "drops"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("queued"));

    assert!(dir.path().join("pending_actions.json").exists());

    let output = ticketq_cmd(&dir, &base)
        .args(["list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = listed.as_array().expect("array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["endpoint"], "/api/tickets");
    assert_eq!(entries[0]["payload"]["title"], "VPN");
    assert!(entries[0]["createdAt"].is_string());

    ticketq_cmd(&dir, &base)
        .args(["drain", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""remaining": 1"#));

    ticketq_cmd(&dir, &base)
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 1 queued writes"));

    ticketq_cmd(&dir, &base)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No queued writes"));
}

#[test]
fn test_submit_rejects_invalid_payload() {
    let dir = TempDir::new().unwrap();
    ticketq_cmd(&dir, &unreachable_base())
        .args(["submit", "/api/tickets", "{not json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Payload is not valid JSON"));

    assert!(!dir.path().join("pending_actions.json").exists());
}

#[test]
fn test_fetch_offline_prints_fallback() {
    let dir = TempDir::new().unwrap();
    let output = ticketq_cmd(&dir, &unreachable_base())
        .args(["fetch", "/api/tickets", "--fallback", "[]", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let fetched: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(fetched["fromMock"], true);
    assert_eq!(fetched["data"], serde_json::json!([]));
}

#[test]
fn test_list_reports_corrupt_queue() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("pending_actions.json"), "{{{").unwrap();

    ticketq_cmd(&dir, &unreachable_base())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read the queue"));
}
