// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::sync::SyncStatus;

pub async fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let service = ctx.service()?;
    // Refresh from the probe; the monitor starts optimistic
    service.monitor().check().await;
    let status = service.status().await?;
    println!("{}", render(&status, &ctx.config.api_url, output)?);
    Ok(())
}

pub(crate) fn render(status: &SyncStatus, api_url: &str, output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Text => {
            let mut lines = vec![
                format!("Server: {}", api_url),
                format!("Connectivity: {}", status.connectivity),
                format!("Pending: {}", status.pending),
                format!("Dropped: {}", status.dropped),
            ];
            if status.dropped > 0 {
                lines.push(
                    "\nSome changes could not be saved. Run 'syncq dropped' for details."
                        .to_string(),
                );
            }
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => Ok(serde_json::to_string(status)?),
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
