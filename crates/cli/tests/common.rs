// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// A `syncq` command isolated from the caller's environment.
pub fn syncq(state_dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("syncq");
    cmd.arg("--state-dir")
        .arg(state_dir)
        .env_remove("SYNCQ_STATE_DIR")
        .env_remove("SYNCQ_API_URL")
        .env_remove("SYNCQ_TOKEN")
        .env_remove("SYNCQ_LOG");
    cmd
}

/// Writes a config pointing at `api_url` with short probe timeouts.
pub fn write_config(state_dir: &Path, api_url: &str) {
    let config = format!(
        "api_url = \"{}\"\n\n[http]\ntimeout_secs = 5\n\n[connectivity]\nprobe_timeout_ms = 500\n",
        api_url
    );
    std::fs::write(state_dir.join("config.toml"), config).unwrap();
}

/// Returns a base URL with nothing listening behind it.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}
