// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Starts drains when connectivity comes back.
//!
//! The trigger drains on every transition from disconnected to connected.
//! Repeated `Connected` signals do not trigger. Each drain runs in its own
//! task so a second restore arriving mid-drain reaches the engine and is
//! turned away by its in-flight guard rather than waiting in line.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::connectivity::Connectivity;
use super::engine::DrainOutcome;
use super::service::SyncService;

/// Background task wiring connectivity signals to drains.
pub struct SyncTrigger {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SyncTrigger {
    /// Spawns the trigger for `service`.
    ///
    /// With `periodic` set, a drain is also attempted on that interval. The
    /// engine skips it when offline or already draining.
    pub fn spawn(service: Arc<SyncService>, periodic: Option<Duration>) -> Self {
        let token = CancellationToken::new();
        let cancel = token.clone();
        let mut subscription = service.monitor().subscribe();
        let mut last = service.monitor().current();

        let handle = tokio::spawn(async move {
            let mut ticker = periodic.map(|every| {
                let start = tokio::time::Instant::now() + every;
                let mut ticker = tokio::time::interval_at(start, every);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                ticker
            });

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    signal = subscription.next() => {
                        let Some(state) = signal else { break };
                        let restored = state == Connectivity::Connected
                            && last == Connectivity::Disconnected;
                        last = state;
                        if restored {
                            tracing::info!("connection restored, syncing queued requests");
                            spawn_drain(&service);
                        }
                    }
                    _ = tick(&mut ticker) => {
                        tracing::debug!("periodic sync");
                        spawn_drain(&service);
                    }
                }
            }
            subscription.cancel();
            tracing::debug!("sync trigger stopped");
        });

        SyncTrigger {
            token,
            handle: Some(handle),
        }
    }

    /// Stops listening and waits for the trigger task. In-flight drains
    /// run to completion on their own.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "sync trigger task failed");
            }
        }
    }
}

impl Drop for SyncTrigger {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn tick(ticker: &mut Option<tokio::time::Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn spawn_drain(service: &Arc<SyncService>) {
    let service = Arc::clone(service);
    tokio::spawn(async move {
        match service.trigger_sync().await {
            Ok(DrainOutcome::Completed(_)) => {}
            Ok(DrainOutcome::Skipped(reason)) => {
                tracing::debug!(?reason, "sync skipped");
            }
            Err(e) => tracing::error!(error = %e, "sync failed"),
        }
    });
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
