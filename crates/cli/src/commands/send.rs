// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sq_core::{Method, RequestDescriptor};

use super::Context;
use crate::error::{Error, Result};
use crate::sync::{Outcome, SyncError, SyncService};

/// Builds the request descriptor from command-line parts.
pub fn build_request(
    method: Method,
    path: String,
    data: Option<serde_json::Value>,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
) -> Result<RequestDescriptor> {
    let mut request = RequestDescriptor::new(method, path)?;
    if let Some(body) = data {
        request = request.with_body(body);
    }
    for (name, value) in headers {
        request = request.with_header(name, value);
    }
    for (key, value) in query {
        request = request.with_query(key, value);
    }
    Ok(request)
}

pub async fn run(ctx: &Context, request: RequestDescriptor) -> Result<()> {
    let service = ctx.service()?;
    let line = run_impl(&service, request).await?;
    println!("{}", line);
    Ok(())
}

/// Sends the request and returns the line to print.
///
/// A response with a non-2xx status prints its body and fails.
pub(crate) async fn run_impl(service: &SyncService, request: RequestDescriptor) -> Result<String> {
    let queueable = request.method.is_queueable();
    match service.execute(request).await {
        Ok(Outcome::Completed(response)) if response.is_success() => Ok(response.body),
        Ok(Outcome::Completed(response)) => {
            if !response.body.is_empty() {
                eprintln!("{}", response.body);
            }
            Err(Error::HttpStatus {
                status: response.status,
                body: response.body,
            })
        }
        Ok(Outcome::Queued(record)) => Ok(format!("queued {}", record.id)),
        Err(SyncError::Transport(e)) if e.is_network() && queueable => Err(Error::NotQueued(e)),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[path = "send_tests.rs"]
mod tests;
