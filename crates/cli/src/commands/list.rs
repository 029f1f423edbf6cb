// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sq_core::QueueRecord;

use super::{format_timestamp, Context};
use crate::cli::OutputFormat;
use crate::error::Result;

pub async fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let service = ctx.service()?;
    let records = service.pending().await?;
    let rendered = render_records(&records, output)?;
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    Ok(())
}

/// Renders records one per line, or as a JSON array.
pub(crate) fn render_records(records: &[QueueRecord], output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Text => Ok(records.iter().map(format_record).collect::<Vec<_>>().join("\n")),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
    }
}

fn format_record(record: &QueueRecord) -> String {
    format!(
        "{}  {} {}  retries: {}  queued: {}",
        record.id,
        record.request.method,
        record.request.path,
        record.retry_count,
        format_timestamp(record.enqueued_at)
    )
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
