// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::Context;
use crate::error::Result;

pub async fn run(ctx: &Context) -> Result<()> {
    let service = ctx.service()?;
    let count = service.pending_count().await?;
    service.clear().await?;
    println!("Cleared {} queued request(s)", count);
    Ok(())
}
