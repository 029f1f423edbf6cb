// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running sync: poll connectivity and drain on every restore.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use super::Context;
use crate::error::Result;
use crate::sync::{DrainOutcome, DroppedRecord, SyncService, SyncTrigger};

pub async fn run(ctx: &Context) -> Result<()> {
    let service = Arc::new(ctx.service()?);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        }
    };
    run_impl(
        service,
        &ctx.config.api_url,
        ctx.config.probe_interval(),
        ctx.config.sync_interval(),
        shutdown,
    )
    .await
}

/// Watches until `shutdown` resolves. Storage and transport errors are
/// logged and never end the watch.
pub(crate) async fn run_impl(
    service: Arc<SyncService>,
    api_url: &str,
    probe_interval: Duration,
    sync_interval: Option<Duration>,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let mut dropped = service.subscribe_dropped();

    // Start the trigger before the first probe so its transition is seen
    let trigger = SyncTrigger::spawn(Arc::clone(&service), sync_interval);
    let polling = service.monitor().start(probe_interval);

    let state = service.monitor().check().await;
    eprintln!(
        "Watching {} ({}, {} queued). Press Ctrl-C to stop.",
        api_url,
        state,
        pending_label(&service).await
    );
    if state.is_connected() {
        match service.trigger_sync().await {
            Ok(DrainOutcome::Completed(report)) => {
                tracing::debug!(synced = report.synced, "initial sync done");
            }
            Ok(DrainOutcome::Skipped(reason)) => {
                tracing::debug!(?reason, "initial sync skipped");
            }
            Err(e) => tracing::error!(error = %e, "initial sync failed"),
        }
    }

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            event = dropped.recv() => match event {
                Ok(event) => report_dropped(&event),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    eprintln!("warning: {} change(s) could not be saved", missed);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    trigger.stop().await;
    polling.stop().await;
    eprintln!("{} request(s) still queued", pending_label(&service).await);
    Ok(())
}

async fn pending_label(service: &SyncService) -> String {
    match service.pending_count().await {
        Ok(count) => count.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "cannot read sync queue");
            "unknown".to_string()
        }
    }
}

fn report_dropped(event: &DroppedRecord) {
    eprintln!(
        "warning: could not save {} {} after {} attempts: {}",
        event.record.request.method,
        event.record.request.path,
        event.record.retry_count,
        event.last_error
    );
}

#[cfg(test)]
#[path = "watch_tests.rs"]
mod tests;
