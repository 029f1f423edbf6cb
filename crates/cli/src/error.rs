// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::{SyncError, TransportError};

/// All possible errors that can occur in the sqrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] sq_core::Error),

    #[error("{0}")]
    Sync(#[from] SyncError),

    #[error("no response from server while connected: {0}\n  hint: the request was not queued; retry once the server is reachable")]
    NotQueued(TransportError),

    #[error("server responded with status {status}")]
    HttpStatus { status: u16, body: String },

    #[error("cannot determine state directory\n  hint: pass --state-dir or set SYNCQ_STATE_DIR")]
    NoStateDir,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias using the sqrs Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
