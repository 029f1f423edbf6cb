// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync engine: replays queued records against the backend.
//!
//! One drain is one pass over a snapshot of the queue taken when the drain
//! starts. Each record is replayed in order with the current credential;
//! successes are removed, failures have their retry count bumped, and a
//! record whose count goes past the ceiling is moved to the dead-letter
//! list and announced on the dropped-record channel.
//!
//! At most one drain runs at a time. Within a process an atomic flag guards
//! the drain; across processes sharing a state directory an exclusive lock
//! file does. A drain that finds either taken is skipped, not queued.
//!
//! Write-back re-reads the store under the queue lock: records enqueued
//! during the drain are kept after the survivors, and records removed
//! during the drain are not brought back. The pending queue is written
//! before the dead-letter list, so a dead-letter failure only costs the
//! dead-letter entry.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use sq_core::{QueueRecord, RecordId};
use tokio::sync::broadcast;

use super::connectivity::ConnectivityMonitor;
use super::credentials::CredentialSource;
use super::error::SyncResult;
use super::transport::{OutgoingRequest, Transport};
use super::SharedQueue;

/// Default retry ceiling.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Capacity of the dropped-record broadcast channel.
const DROPPED_CAPACITY: usize = 64;

/// Configuration for the sync engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// A record is dropped once its retry count exceeds this.
    pub max_retries: u32,
    /// Lock file shared by every process draining the same queue.
    pub lock_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_retries: DEFAULT_MAX_RETRIES,
            lock_path: None,
        }
    }
}

/// Why a drain did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Offline,
    AlreadyDraining,
}

/// Counts from one completed drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Records replayed successfully and removed.
    pub synced: usize,
    /// Records that failed and remain queued.
    pub retained: usize,
    /// Records that failed past the retry ceiling and were abandoned.
    pub dropped: usize,
}

/// Result of a drain request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    Skipped(SkipReason),
    Completed(DrainReport),
}

/// A record abandoned at the retry ceiling.
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRecord {
    pub record: QueueRecord,
    /// Failure of the final attempt.
    pub last_error: String,
}

/// Replays the queue against the backend.
pub struct SyncEngine {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
    monitor: ConnectivityMonitor,
    queue: SharedQueue,
    dead_letters: SharedQueue,
    config: EngineConfig,
    draining: AtomicBool,
    dropped_tx: broadcast::Sender<DroppedRecord>,
}

impl SyncEngine {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialSource>,
        monitor: ConnectivityMonitor,
        queue: SharedQueue,
        dead_letters: SharedQueue,
        config: EngineConfig,
    ) -> Self {
        let (dropped_tx, _) = broadcast::channel(DROPPED_CAPACITY);
        SyncEngine {
            transport,
            credentials,
            monitor,
            queue,
            dead_letters,
            config,
            draining: AtomicBool::new(false),
            dropped_tx,
        }
    }

    /// Returns true while a drain is in flight in this process.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Acquire)
    }

    /// Subscribes to records abandoned at the retry ceiling.
    pub fn subscribe_dropped(&self) -> broadcast::Receiver<DroppedRecord> {
        self.dropped_tx.subscribe()
    }

    /// Runs one drain if connected and no other drain is in flight.
    pub async fn drain(&self) -> SyncResult<DrainOutcome> {
        if !self.monitor.check().await.is_connected() {
            tracing::info!("no connection, skipping sync");
            return Ok(DrainOutcome::Skipped(SkipReason::Offline));
        }

        let Some(_guard) = DrainGuard::acquire(&self.draining) else {
            tracing::debug!("drain already in flight, ignoring trigger");
            return Ok(DrainOutcome::Skipped(SkipReason::AlreadyDraining));
        };

        let _process_lock = match &self.config.lock_path {
            Some(path) => match try_lock(path)? {
                Some(file) => Some(file),
                None => {
                    tracing::debug!(lock = %path.display(), "another process is draining");
                    return Ok(DrainOutcome::Skipped(SkipReason::AlreadyDraining));
                }
            },
            None => None,
        };

        let snapshot = self.queue.lock().await?.read_all()?;
        if snapshot.is_empty() {
            tracing::debug!("sync queue empty");
            return Ok(DrainOutcome::Completed(DrainReport::default()));
        }

        tracing::info!(count = snapshot.len(), "processing queued requests");
        let snapshot_ids: HashSet<RecordId> = snapshot.iter().map(|r| r.id.clone()).collect();

        let mut report = DrainReport::default();
        let mut survivors = Vec::new();
        let mut dropped = Vec::new();

        for mut record in snapshot {
            let outgoing = OutgoingRequest {
                request: record.request.clone(),
                bearer: self.credentials.bearer_token(),
            };

            let failure = match self.transport.send(outgoing).await {
                Ok(response) if response.is_success() => {
                    tracing::debug!(id = %record.id, status = response.status, "replayed");
                    report.synced += 1;
                    continue;
                }
                Ok(response) => format!("server responded with status {}", response.status),
                Err(e) => e.to_string(),
            };

            let attempts = record.record_failure();
            if record.exceeds(self.config.max_retries) {
                tracing::warn!(
                    id = %record.id,
                    method = %record.request.method,
                    path = %record.request.path,
                    attempts,
                    error = %failure,
                    "giving up on queued request"
                );
                dropped.push(DroppedRecord {
                    record,
                    last_error: failure,
                });
            } else {
                tracing::debug!(
                    id = %record.id,
                    attempts,
                    error = %failure,
                    "replay failed, keeping"
                );
                survivors.push(record);
            }
        }

        {
            let mut queue = self.queue.lock().await?;
            let current = queue.read_all()?;
            let current_ids: HashSet<&RecordId> = current.iter().map(|r| &r.id).collect();

            survivors.retain(|r| current_ids.contains(&r.id));
            report.retained = survivors.len();

            let arrived = current
                .iter()
                .filter(|r| !snapshot_ids.contains(&r.id))
                .cloned();
            survivors.extend(arrived);
            queue.replace(&survivors)?;
        }

        // Dead letters are best effort and never hold back the write-back.
        report.dropped = dropped.len();
        if !dropped.is_empty() {
            if let Err(e) = self.record_dead_letters(&dropped).await {
                tracing::warn!(
                    count = dropped.len(),
                    error = %e,
                    "failed to record dropped requests"
                );
            }
        }
        for event in dropped {
            // No subscribers is fine; the dead-letter list has it
            let _ = self.dropped_tx.send(event);
        }

        tracing::info!(
            synced = report.synced,
            retained = report.retained,
            dropped = report.dropped,
            "sync complete"
        );
        Ok(DrainOutcome::Completed(report))
    }

    async fn record_dead_letters(&self, dropped: &[DroppedRecord]) -> SyncResult<()> {
        let records = dropped.iter().map(|d| d.record.clone()).collect();
        self.dead_letters.lock().await?.append(records)?;
        Ok(())
    }
}

/// Holds the in-flight flag for the duration of a drain.
struct DrainGuard<'a>(&'a AtomicBool);

impl<'a> DrainGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| DrainGuard(flag))
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Takes the cross-process drain lock, or returns `None` if it is held.
fn try_lock(path: &Path) -> std::io::Result<Option<File>> {
    use fs2::FileExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)?;
    match file.try_lock_exclusive() {
        Ok(()) => Ok(Some(file)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
