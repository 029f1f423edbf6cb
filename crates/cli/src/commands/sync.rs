// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Manual sync: one drain of the queue.

use serde::Serialize;

use super::Context;
use crate::cli::OutputFormat;
use crate::error::Result;
use crate::sync::{DrainOutcome, DrainReport, SkipReason};

#[derive(Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum SyncJson {
    Completed(DrainReport),
    Skipped { reason: SkipReason },
}

pub async fn run(ctx: &Context, output: OutputFormat) -> Result<()> {
    let service = ctx.service()?;
    let outcome = service.trigger_sync().await?;
    println!("{}", render(outcome, output)?);
    warn_dropped(&outcome);
    Ok(())
}

pub(crate) fn render(outcome: DrainOutcome, output: OutputFormat) -> Result<String> {
    match output {
        OutputFormat::Text => Ok(match outcome {
            DrainOutcome::Completed(r) => {
                format!("synced {}, retained {}, dropped {}", r.synced, r.retained, r.dropped)
            }
            DrainOutcome::Skipped(SkipReason::Offline) => {
                "offline: queued requests kept for later".to_string()
            }
            DrainOutcome::Skipped(SkipReason::AlreadyDraining) => {
                "sync already in progress".to_string()
            }
        }),
        OutputFormat::Json => {
            let json = match outcome {
                DrainOutcome::Completed(report) => SyncJson::Completed(report),
                DrainOutcome::Skipped(reason) => SyncJson::Skipped { reason },
            };
            Ok(serde_json::to_string(&json)?)
        }
    }
}

fn warn_dropped(outcome: &DrainOutcome) {
    if let DrainOutcome::Completed(report) = outcome {
        if report.dropped > 0 {
            eprintln!(
                "warning: {} change(s) could not be saved and were dropped\n  hint: run 'syncq dropped' to see them",
                report.dropped
            );
        }
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
