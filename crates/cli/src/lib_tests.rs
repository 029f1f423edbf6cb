// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use super::*;
use clap::Parser;
use tempfile::TempDir;

#[test]
fn test_log_filter_levels() {
    if env::log_filter().is_none() {
        assert_eq!(log_filter(true), "info");
        assert_eq!(log_filter(false), "warn");
    }
}

#[test]
fn test_run_clear_on_fresh_state_dir() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["syncq", "--state-dir", dir, "clear"]).unwrap();

    run(cli).unwrap();
}

#[test]
fn test_run_rejects_bad_config() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("config.toml"), "[http]\ntimeout_secs = 0\n").unwrap();
    let dir = temp.path().to_str().unwrap();
    let cli = Cli::try_parse_from(["syncq", "--state-dir", dir, "list"]).unwrap();

    let err = run(cli).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
