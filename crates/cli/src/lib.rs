// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sqrs - Offline write queue and replay for REST clients.
//!
//! This crate provides the library behind the `syncq` CLI: write requests
//! that get no response while offline are stored in a durable queue and
//! replayed in order once the backend is reachable again.
//!
//! # Main Components
//!
//! - [`sync::SyncService`] - Request execution with offline queuing, plus queue replay
//! - [`sync::SyncTrigger`] - Drains the queue whenever connectivity is restored
//! - [`Config`] - Client configuration (API URL, storage backend, retry ceiling)
//! - [`Error`] - Error types for all operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use sqrs::sync::{HttpTransport, SyncService, Outcome};
//!
//! let transport = HttpTransport::new("http://localhost:8001/api", DEFAULT_TIMEOUT)?;
//! let service = SyncService::builder(Arc::new(transport))
//!     .storage(Arc::new(FileStorage::open(&state_dir)?))
//!     .build();
//!
//! match service.execute(request).await? {
//!     Outcome::Completed(response) => println!("{}", response.status),
//!     Outcome::Queued(record) => println!("queued {}", record.id),
//! }
//! ```

mod cli;
mod commands;
mod env;

pub mod config;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat};
pub use config::{resolve_state_dir, Config};
pub use error::{Error, Result};

use commands::Context;

/// Returns the log filter directive: `SYNCQ_LOG`, else `info` when verbose
/// and `warn` otherwise.
pub fn log_filter(verbose: bool) -> String {
    match env::log_filter() {
        Some(filter) => filter,
        None if verbose => "info".to_string(),
        None => "warn".to_string(),
    }
}

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))?;
    rt.block_on(run_async(cli))
}

async fn run_async(cli: Cli) -> Result<()> {
    let ctx = Context::load(cli.state_dir.as_deref())?;
    match cli.command {
        Command::Send {
            method,
            path,
            data,
            headers,
            query,
        } => {
            let request = commands::send::build_request(method, path, data, headers, query)?;
            commands::send::run(&ctx, request).await
        }
        Command::Sync { output } => commands::sync::run(&ctx, output).await,
        Command::Status { output } => commands::status::run(&ctx, output).await,
        Command::List { output } => commands::list::run(&ctx, output).await,
        Command::Dropped { clear, output } => commands::dropped::run(&ctx, clear, output).await,
        Command::Clear => commands::clear::run(&ctx).await,
        Command::Watch => commands::watch::run(&ctx).await,
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
