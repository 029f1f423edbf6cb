// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use sq_core::Method;

/// Parse an HTTP method name, case-insensitively.
fn method_arg(s: &str) -> Result<Method, String> {
    s.parse::<Method>().map_err(|e| e.to_string())
}

/// Parse a request path relative to the API base.
fn path_arg(s: &str) -> Result<String, String> {
    if s.starts_with('/') {
        Ok(s.to_string())
    } else {
        Err("must start with '/'".to_string())
    }
}

/// Parse a `Name: value` header.
fn header_arg(s: &str) -> Result<(String, String), String> {
    sq_core::parse_header(s).map_err(|e| e.to_string())
}

/// Parse a `key=value` query parameter.
fn query_arg(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err("expected key=value".to_string()),
    }
}

/// Parse a JSON request body.
fn json_arg(s: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {}", e))
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "syncq")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Offline write queue and replay client for a REST backend")]
#[command(
    long_about = "Offline write queue and replay client for a REST backend.\n\n\
    Write requests that get no response while the backend is unreachable are kept \
    in a durable queue and replayed in order once connectivity returns."
)]
pub struct Cli {
    /// Directory holding config.toml, the queue and lock files
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,

    /// Log sync activity to stderr (SYNCQ_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Send a request, queuing it if the backend is unreachable
    #[command(after_help = "\
Examples:
  syncq send POST /attendance -d '{\"studentId\":7,\"status\":\"present\"}'
  syncq send PUT /students/7 -d '{\"grade\":\"B\"}' -H 'X-Device: tablet-3'
  syncq send DELETE /sessions/12 -q force=true")]
    Send {
        /// HTTP method (GET, POST, PUT, DELETE)
        #[arg(value_parser = method_arg)]
        method: Method,

        /// Path relative to the API base URL, starting with '/'
        #[arg(value_parser = path_arg)]
        path: String,

        /// JSON request body
        #[arg(long, short, value_name = "JSON", value_parser = json_arg)]
        data: Option<serde_json::Value>,

        /// Extra header (repeatable)
        #[arg(short = 'H', long = "header", value_name = "NAME: VALUE", value_parser = header_arg)]
        headers: Vec<(String, String)>,

        /// Query parameter (repeatable)
        #[arg(short, long = "query", value_name = "KEY=VALUE", value_parser = query_arg)]
        query: Vec<(String, String)>,
    },

    /// Replay queued requests now
    Sync {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show connectivity and queue counts
    Status {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List queued requests in replay order
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// List requests abandoned after too many failed replays
    Dropped {
        /// Forget the dropped requests after listing them
        #[arg(long)]
        clear: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Discard every queued request
    Clear,

    /// Watch connectivity and replay the queue whenever it returns
    Watch,
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
