// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The assembled offline sync stack.
//!
//! [`SyncService`] owns one queue, one connectivity monitor, one transport
//! and one credential source, and hands them to the interceptor and the
//! engine so both work against the same state. Build one per backend with
//! [`SyncServiceBuilder`].

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use sq_core::{
    ClockSource, MemoryStorage, QueueRecord, QueueStore, RequestDescriptor, Storage, SystemClock,
};
use tokio::sync::broadcast;

use super::connectivity::{Connectivity, ConnectivityMonitor};
use super::credentials::{CredentialSource, StaticToken};
use super::engine::{DrainOutcome, DroppedRecord, EngineConfig, SyncEngine};
use super::error::SyncResult;
use super::interceptor::{Interceptor, Outcome};
use super::shared::SharedQueue;
use super::transport::Transport;

/// Point-in-time view of the sync state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub connectivity: Connectivity,
    /// True while a drain runs in this process.
    pub syncing: bool,
    /// Records waiting to be replayed.
    pub pending: usize,
    /// Records abandoned at the retry ceiling.
    pub dropped: usize,
}

/// Builder for [`SyncService`].
pub struct SyncServiceBuilder {
    transport: Arc<dyn Transport>,
    storage: Option<Arc<dyn Storage>>,
    credentials: Option<Arc<dyn CredentialSource>>,
    monitor: Option<ConnectivityMonitor>,
    clock: Option<Arc<dyn ClockSource>>,
    engine: EngineConfig,
    lock_dir: Option<PathBuf>,
}

impl SyncServiceBuilder {
    /// Queue storage. Defaults to in-memory.
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Bearer token source. Defaults to no credential.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialSource>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Connectivity monitor. Defaults to one fed only by reports.
    pub fn monitor(mut self, monitor: ConnectivityMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn engine_config(mut self, config: EngineConfig) -> Self {
        self.engine = config;
        self
    }

    /// Directory for the queue lock files shared with other processes.
    /// Without one, queue access is serialized within this process only.
    pub fn lock_dir(mut self, dir: PathBuf) -> Self {
        self.lock_dir = Some(dir);
        self
    }

    pub fn build(self) -> SyncService {
        let storage = self.storage.unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let credentials = self.credentials.unwrap_or_else(|| Arc::new(StaticToken::none()));
        let monitor = self.monitor.unwrap_or_default();
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let share = |store: QueueStore| match &self.lock_dir {
            Some(dir) => {
                let lock_path = dir.join(format!("{}.lock", store.key()));
                SharedQueue::with_lock_file(store, lock_path)
            }
            None => SharedQueue::new(store),
        };
        let queue = share(QueueStore::pending(Arc::clone(&storage)));
        let dead_letters = share(QueueStore::dead_letters(storage));

        let interceptor = Interceptor::new(
            Arc::clone(&self.transport),
            Arc::clone(&credentials),
            monitor.clone(),
            queue.clone(),
            clock,
        );
        let engine = SyncEngine::new(
            self.transport,
            credentials,
            monitor.clone(),
            queue.clone(),
            dead_letters.clone(),
            self.engine,
        );

        SyncService {
            monitor,
            queue,
            dead_letters,
            interceptor,
            engine,
        }
    }
}

/// Offline-aware request execution and queue replay.
pub struct SyncService {
    monitor: ConnectivityMonitor,
    queue: SharedQueue,
    dead_letters: SharedQueue,
    interceptor: Interceptor,
    engine: SyncEngine,
}

impl SyncService {
    pub fn builder(transport: Arc<dyn Transport>) -> SyncServiceBuilder {
        SyncServiceBuilder {
            transport,
            storage: None,
            credentials: None,
            monitor: None,
            clock: None,
            engine: EngineConfig::default(),
            lock_dir: None,
        }
    }

    /// Sends a request, queuing it if it fails while offline.
    pub async fn execute(&self, request: RequestDescriptor) -> SyncResult<Outcome> {
        self.interceptor.execute(request).await
    }

    /// Queues a request without sending it, if offline.
    pub async fn enqueue_if_offline(
        &self,
        request: RequestDescriptor,
    ) -> SyncResult<Option<QueueRecord>> {
        self.interceptor.enqueue_if_offline(request).await
    }

    /// Runs one drain of the queue.
    pub async fn trigger_sync(&self) -> SyncResult<DrainOutcome> {
        self.engine.drain().await
    }

    pub fn is_syncing(&self) -> bool {
        self.engine.is_draining()
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    pub fn subscribe_dropped(&self) -> broadcast::Receiver<DroppedRecord> {
        self.engine.subscribe_dropped()
    }

    pub async fn pending(&self) -> SyncResult<Vec<QueueRecord>> {
        Ok(self.queue.lock().await?.read_all()?)
    }

    pub async fn pending_count(&self) -> SyncResult<usize> {
        Ok(self.queue.lock().await?.len()?)
    }

    pub async fn dead_letters(&self) -> SyncResult<Vec<QueueRecord>> {
        Ok(self.dead_letters.lock().await?.read_all()?)
    }

    /// Discards every pending record.
    pub async fn clear(&self) -> SyncResult<()> {
        self.queue.lock().await?.clear()?;
        tracing::info!("sync queue cleared");
        Ok(())
    }

    pub async fn clear_dead_letters(&self) -> SyncResult<()> {
        self.dead_letters.lock().await?.clear()?;
        Ok(())
    }

    pub async fn status(&self) -> SyncResult<SyncStatus> {
        Ok(SyncStatus {
            connectivity: self.monitor.current(),
            syncing: self.is_syncing(),
            pending: self.pending_count().await?,
            dropped: self.dead_letters.lock().await?.len()?,
        })
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
