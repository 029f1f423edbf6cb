// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable queue of pending mutations.
//!
//! The whole queue is one JSON array stored under a single storage key.
//! Every mutation is a read-modify-write of that document, so callers
//! sharing a store across tasks must serialize access to it.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::record::QueueRecord;
use crate::storage::{validate_key, Storage};

/// Storage key of the pending queue.
pub const QUEUE_KEY: &str = "sync_queue";

/// Storage key of records abandoned at the retry ceiling.
pub const DEAD_LETTER_KEY: &str = "sync_dead_letters";

/// Ordered, persisted sequence of queue records.
pub struct QueueStore {
    storage: Arc<dyn Storage>,
    key: String,
}

impl QueueStore {
    /// Creates a store for the sequence under `key`.
    pub fn new(storage: Arc<dyn Storage>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(QueueStore { storage, key })
    }

    /// The pending-mutation queue.
    pub fn pending(storage: Arc<dyn Storage>) -> Self {
        QueueStore {
            storage,
            key: QUEUE_KEY.to_string(),
        }
    }

    /// The dead-letter list for abandoned records.
    pub fn dead_letters(storage: Arc<dyn Storage>) -> Self {
        QueueStore {
            storage,
            key: DEAD_LETTER_KEY.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Appends a record to the end of the sequence.
    pub fn enqueue(&mut self, record: QueueRecord) -> Result<()> {
        self.append(vec![record])
    }

    /// Appends records to the end of the sequence, preserving their order.
    pub fn append(&mut self, records: Vec<QueueRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let mut all = self.read_all()?;
        all.extend(records);
        self.write(&all)
    }

    /// Returns the full ordered sequence, or an empty one if nothing is stored.
    pub fn read_all(&self) -> Result<Vec<QueueRecord>> {
        let raw = match self.storage.get(&self.key)? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| Error::CorruptedData {
            key: self.key.clone(),
            reason: e.to_string(),
        })
    }

    /// Overwrites the sequence with exactly `records`.
    pub fn replace(&mut self, records: &[QueueRecord]) -> Result<()> {
        if records.is_empty() {
            return self.clear();
        }
        self.write(records)
    }

    /// Empties the sequence.
    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove(&self.key)
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read_all()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn write(&mut self, records: &[QueueRecord]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.storage.set(&self.key, &json)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
