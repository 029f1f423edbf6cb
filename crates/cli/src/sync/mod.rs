// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Offline request queuing and replay.
//!
//! Write requests that fail for lack of a network are captured into a
//! durable queue and replayed once connectivity returns.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Interceptor │────►│  Transport  │────►│   Backend   │
//! │             │◄────│   (trait)   │◄────│     API     │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │ offline           ▲
//!        ▼                   │ replay
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ QueueStore  │◄───►│ SyncEngine  │◄────│ SyncTrigger │
//! │  (storage)  │     │   (drain)   │     │             │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                ▲
//!                                         ┌─────────────┐
//!                                         │ Connectivity│
//!                                         │   Monitor   │
//!                                         └─────────────┘
//! ```
//!
//! # Features
//!
//! - Queues POST, PUT and DELETE requests that get no response while offline
//! - Replays in enqueue order with the credential current at replay time
//! - Drops a record after it has failed more than the retry ceiling
//! - At most one drain in flight, across processes sharing a state dir
//! - Queue read-modify-writes serialized across those processes too
//! - Injectable transport, credential source and clock for testing

mod connectivity;
mod credentials;
mod engine;
mod error;
mod interceptor;
mod service;
mod shared;
mod transport;
mod trigger;

pub use connectivity::{
    Connectivity, ConnectivityMonitor, MonitorHandle, Probe, Subscription, TcpProbe,
};
pub use credentials::{CredentialSource, StaticToken, TokenFile};
pub use engine::{
    DrainOutcome, DrainReport, DroppedRecord, EngineConfig, SkipReason, SyncEngine,
    DEFAULT_MAX_RETRIES,
};
pub use error::{SyncError, SyncResult};
pub use interceptor::{Interceptor, Outcome};
pub use service::{SyncService, SyncServiceBuilder, SyncStatus};
pub use shared::{QueueGuard, SharedQueue};
pub use transport::{
    HttpResponse, HttpTransport, OutgoingRequest, Transport, TransportError, TransportResult,
    DEFAULT_TIMEOUT,
};
pub use trigger::SyncTrigger;

#[cfg(test)]
pub(crate) mod test_helpers;
