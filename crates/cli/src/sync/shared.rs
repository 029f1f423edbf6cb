// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Queue store shared between tasks and between processes.
//!
//! Every queue mutation is a read-modify-write of one document. Tasks in
//! this process serialize on a mutex. Processes sharing a state directory
//! additionally serialize on an exclusive lock file, taken after the mutex
//! and released with the guard.

use std::fs::{File, OpenOptions};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sq_core::QueueStore;
use tokio::sync::{Mutex, MutexGuard};

use super::error::SyncResult;

/// A queue store shared between the interceptor, the engine and other
/// processes using the same state directory.
#[derive(Clone)]
pub struct SharedQueue {
    store: Arc<Mutex<QueueStore>>,
    lock_path: Option<Arc<PathBuf>>,
}

impl SharedQueue {
    /// Shares `store` within this process only.
    pub fn new(store: QueueStore) -> Self {
        SharedQueue {
            store: Arc::new(Mutex::new(store)),
            lock_path: None,
        }
    }

    /// Shares `store` within this process and with every process that
    /// locks the same `lock_path`.
    pub fn with_lock_file(store: QueueStore, lock_path: PathBuf) -> Self {
        SharedQueue {
            store: Arc::new(Mutex::new(store)),
            lock_path: Some(Arc::new(lock_path)),
        }
    }

    /// Waits for exclusive access to the store.
    pub async fn lock(&self) -> SyncResult<QueueGuard<'_>> {
        let store = self.store.lock().await;
        let file = match &self.lock_path {
            Some(path) => {
                let path = Arc::clone(path);
                let file = tokio::task::spawn_blocking(move || lock_exclusive(&path))
                    .await
                    .map_err(std::io::Error::other)??;
                Some(file)
            }
            None => None,
        };
        Ok(QueueGuard { store, _file: file })
    }
}

/// Exclusive access to a [`SharedQueue`]. The lock file, if any, is
/// released on drop.
pub struct QueueGuard<'a> {
    store: MutexGuard<'a, QueueStore>,
    _file: Option<File>,
}

impl Deref for QueueGuard<'_> {
    type Target = QueueStore;

    fn deref(&self) -> &QueueStore {
        &self.store
    }
}

impl DerefMut for QueueGuard<'_> {
    fn deref_mut(&mut self) -> &mut QueueStore {
        &mut self.store
    }
}

/// Opens `path` and blocks until it is exclusively locked.
fn lock_exclusive(path: &Path) -> std::io::Result<File> {
    use fs2::FileExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)?;
    file.lock_exclusive()?;
    Ok(file)
}

#[cfg(test)]
#[path = "shared_tests.rs"]
mod tests;
