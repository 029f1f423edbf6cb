// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rust specs for global flags and argument validation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn syncq() -> Command {
    let mut cmd = cargo_bin_cmd!("syncq");
    cmd.env_remove("SYNCQ_STATE_DIR").env_remove("SYNCQ_API_URL").env_remove("SYNCQ_LOG");
    cmd
}

#[test]
fn version_prints_package_version() {
    syncq()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_lists_commands() {
    let output = syncq().arg("--help").output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    for command in ["send", "sync", "status", "list", "dropped", "clear", "watch"] {
        assert!(stdout.contains(command), "help is missing {}", command);
    }
}

#[test]
fn no_subcommand_fails() {
    syncq().assert().failure();
}

#[test]
fn send_rejects_unknown_method() {
    syncq()
        .args(["send", "PATCH", "/attendance"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid method"));
}

#[test]
fn send_rejects_relative_path() {
    syncq()
        .args(["send", "POST", "attendance"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must start with '/'"));
}

#[test]
fn state_dir_flag_overrides_env() {
    let from_env = TempDir::new().unwrap();
    let from_flag = TempDir::new().unwrap();
    std::fs::write(
        from_flag.path().join("config.toml"),
        "api_url = \"http://127.0.0.1:9/flag\"\n\n[connectivity]\nprobe_timeout_ms = 500\n",
    )
    .unwrap();

    syncq()
        .env("SYNCQ_STATE_DIR", from_env.path())
        .arg("--state-dir")
        .arg(from_flag.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("/flag"));
}

#[test]
fn malformed_config_is_reported() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), "api_url = [").unwrap();

    syncq()
        .arg("--state-dir")
        .arg(temp.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn verbose_keeps_logs_off_stdout() {
    let temp = TempDir::new().unwrap();
    syncq()
        .arg("--state-dir")
        .arg(temp.path())
        .args(["-v", "list", "-o", "json"])
        .assert()
        .success()
        .stdout("[]\n");
}
