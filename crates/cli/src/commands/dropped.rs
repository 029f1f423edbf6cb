// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::list::render_records;
use super::Context;
use crate::cli::OutputFormat;
use crate::error::Result;

/// Lists requests abandoned at the retry ceiling, optionally forgetting them.
pub async fn run(ctx: &Context, clear: bool, output: OutputFormat) -> Result<()> {
    let service = ctx.service()?;
    let records = service.dead_letters().await?;
    let rendered = render_records(&records, output)?;
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    if clear {
        service.clear_dead_letters().await?;
        eprintln!("Forgot {} dropped request(s)", records.len());
    }
    Ok(())
}
