// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for sq-core operations.

use thiserror::Error;

/// All possible errors that can occur in sq-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("method {0} is never queued\n  hint: only POST, PUT and DELETE requests are replayed")]
    NotQueueable(String),

    #[error("invalid method: '{0}'\n  hint: valid methods are: GET, POST, PUT, DELETE")]
    InvalidMethod(String),

    #[error("invalid path: '{0}'\n  hint: paths are relative to the API base and must start with '/'")]
    InvalidPath(String),

    #[error("invalid header: '{0}'\n  hint: headers are written as 'Name: value'")]
    InvalidHeader(String),

    #[error("invalid storage key: '{0}'\n  hint: keys use letters, digits, '_' and '-' only")]
    InvalidKey(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data under key '{key}': {reason}")]
    CorruptedData { key: String, reason: String },
}

/// A specialized Result type for sq-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
