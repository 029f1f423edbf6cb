// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for the queue inspection commands: `status`, `list`,
//! `dropped` and `clear`.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn syncq(temp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("syncq");
    cmd.env("SYNCQ_STATE_DIR", temp.path())
        .env_remove("SYNCQ_API_URL")
        .env_remove("SYNCQ_TOKEN")
        .env_remove("SYNCQ_LOG");
    cmd
}

/// A state dir whose backend is the discard port, which nothing serves.
fn offline_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("config.toml"),
        "api_url = \"http://127.0.0.1:9/api\"\n\n[connectivity]\nprobe_timeout_ms = 500\n",
    )
    .unwrap();
    temp
}

fn queue_attendance(temp: &TempDir, student: u32) {
    let body = format!("{{\"studentId\":{},\"status\":\"present\"}}", student);
    syncq(temp)
        .args(["send", "POST", "/attendance", "-d", &body])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("queued "));
}

#[test]
fn status_on_fresh_state_dir() {
    let temp = offline_temp();
    syncq(&temp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Server: http://127.0.0.1:9/api"))
        .stdout(predicate::str::contains("Pending: 0"))
        .stdout(predicate::str::contains("Dropped: 0"));
}

#[test]
fn list_is_empty_on_fresh_state_dir() {
    let temp = offline_temp();
    syncq(&temp).arg("list").assert().success().stdout("");
}

#[test]
fn list_shows_queued_requests_in_order() {
    let temp = offline_temp();
    queue_attendance(&temp, 1);
    syncq(&temp)
        .args(["send", "DELETE", "/sessions/12"])
        .assert()
        .success();

    let output = syncq(&temp).arg("list").output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("POST /attendance  retries: 0"), "got {}", lines[0]);
    assert!(lines[1].contains("DELETE /sessions/12  retries: 0"), "got {}", lines[1]);
}

#[test]
fn list_json_omits_credentials() {
    let temp = offline_temp();
    syncq(&temp)
        .args(["send", "POST", "/attendance", "-d", "{}", "-H", "Authorization: Bearer secret"])
        .assert()
        .success();

    let output = syncq(&temp).args(["list", "-o", "json"]).output().unwrap();
    let records: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();

    similar_asserts::assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["retryCount"], 0);
    assert!(!String::from_utf8_lossy(&output.stdout).contains("secret"));
}

#[test]
fn sync_while_offline_keeps_queue() {
    let temp = offline_temp();
    queue_attendance(&temp, 1);

    syncq(&temp)
        .arg("sync")
        .assert()
        .success()
        .stdout(predicate::str::contains("offline"));

    syncq(&temp)
        .args(["status", "-o", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"pending\":1"));
}

#[test]
fn clear_empties_queue() {
    let temp = offline_temp();
    queue_attendance(&temp, 1);
    queue_attendance(&temp, 2);

    syncq(&temp)
        .arg("clear")
        .assert()
        .success()
        .stdout("Cleared 2 queued request(s)\n");

    syncq(&temp).arg("list").assert().success().stdout("");
}

#[test]
fn dropped_is_empty_by_default() {
    let temp = offline_temp();
    syncq(&temp).arg("dropped").assert().success().stdout("");
    syncq(&temp)
        .args(["dropped", "-o", "json"])
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn sqlite_backend_persists_queue() {
    let temp = offline_temp();
    let config = std::fs::read_to_string(temp.path().join("config.toml")).unwrap();
    std::fs::write(
        temp.path().join("config.toml"),
        format!("{}\n[storage]\nbackend = \"sqlite\"\n", config),
    )
    .unwrap();

    queue_attendance(&temp, 1);

    assert!(temp.path().join("queue.db").exists());
    syncq(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("POST /attendance"));
}
