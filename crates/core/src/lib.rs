// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sq-core: Shared library for the syncq offline mutation queue
//!
//! This crate provides the data model for queued write requests and the
//! durable storage they live in. It has no networking and no async runtime;
//! the replay machinery lives in the `syncq` crate.

pub mod clock;
pub mod error;
pub mod queue;
pub mod record;
pub mod sqlite;
pub mod storage;

pub use clock::{ClockSource, SystemClock};
pub use error::{Error, Result};
pub use queue::{QueueStore, DEAD_LETTER_KEY, QUEUE_KEY};
pub use record::{parse_header, Method, QueueRecord, RecordId, RequestDescriptor};
pub use sqlite::SqliteStorage;
pub use storage::{FileStorage, MemoryStorage, Storage};
