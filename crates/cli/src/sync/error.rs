// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error type shared by the interceptor, engine and service.

use super::transport::TransportError;

/// Error type for sync operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Transport error that was not converted into a queued record.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Queue storage error.
    #[error("queue error: {0}")]
    Queue(#[from] sq_core::Error),

    /// A drain or queue lock file could not be opened or locked.
    #[error("lock file error: {0}")]
    Lock(#[from] std::io::Error),
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
