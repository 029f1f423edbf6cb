// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use sq_core::{ClockSource, MemoryStorage, Method, RequestDescriptor, Storage};

use super::connectivity::{Connectivity, ConnectivityMonitor, Probe};
use super::engine::EngineConfig;
use super::service::SyncService;
use super::transport::{HttpResponse, OutgoingRequest, Transport, TransportError, TransportResult};

/// What the mock transport does with one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockReply {
    Status(u16),
    Timeout,
    Unreachable,
}

/// Mock transport for testing without real sockets.
///
/// Replies are taken from the script in order; once it runs out every
/// request gets the fallback reply.
pub struct MockTransport {
    script: Mutex<VecDeque<MockReply>>,
    fallback: Mutex<MockReply>,
    /// Requests that were sent via send().
    sent: Mutex<Vec<OutgoingRequest>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new(fallback: MockReply) -> Self {
        MockTransport {
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(fallback),
            sent: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn ok() -> Self {
        Self::new(MockReply::Status(201))
    }

    pub fn offline() -> Self {
        Self::new(MockReply::Unreachable)
    }

    /// Sleeps this long before every reply.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue replies ahead of the fallback.
    pub fn script(&self, replies: impl IntoIterator<Item = MockReply>) {
        self.script.lock().unwrap().extend(replies);
    }

    pub fn set_fallback(&self, reply: MockReply) {
        *self.fallback.lock().unwrap() = reply;
    }

    /// Get all requests that were sent.
    pub fn sent(&self) -> Vec<OutgoingRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Transport for MockTransport {
    fn send(
        &self,
        request: OutgoingRequest,
    ) -> Pin<Box<dyn Future<Output = TransportResult<HttpResponse>> + Send + '_>> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(request);
            let reply = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| *self.fallback.lock().unwrap());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match reply {
                MockReply::Status(status) => Ok(HttpResponse {
                    status,
                    body: String::new(),
                }),
                MockReply::Timeout => Err(TransportError::Timeout(Duration::from_secs(30))),
                MockReply::Unreachable => {
                    Err(TransportError::Unreachable("connection refused".into()))
                }
            }
        })
    }
}

/// Probe that reports whatever it was last set to.
pub struct SwitchProbe {
    reachable: Mutex<bool>,
}

impl SwitchProbe {
    pub fn new(reachable: bool) -> Self {
        SwitchProbe {
            reachable: Mutex::new(reachable),
        }
    }

    pub fn set(&self, reachable: bool) {
        *self.reachable.lock().unwrap() = reachable;
    }
}

impl Probe for SwitchProbe {
    fn check(&self) -> Pin<Box<dyn Future<Output = Connectivity> + Send + '_>> {
        let reachable = *self.reachable.lock().unwrap();
        Box::pin(async move { Connectivity::from_reachable(reachable) })
    }
}

/// Clock that advances one millisecond per reading.
pub struct FixedClock(AtomicU64);

impl FixedClock {
    pub fn new(start_ms: u64) -> Self {
        FixedClock(AtomicU64::new(start_ms))
    }
}

impl ClockSource for FixedClock {
    fn now_ms(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// The canonical offline write: an attendance check-in.
pub fn attendance_request(student: u32) -> RequestDescriptor {
    RequestDescriptor::new(Method::Post, "/attendance")
        .unwrap()
        .with_body(json!({ "studentId": student, "status": "present" }))
}

/// A service over in-memory storage with the given transport, starting in
/// the given connectivity state.
pub fn make_service(
    transport: Arc<MockTransport>,
    state: Connectivity,
) -> (SyncService, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let service = make_service_with(transport, state, Arc::clone(&storage) as Arc<dyn Storage>);
    (service, storage)
}

pub fn make_service_with(
    transport: Arc<MockTransport>,
    state: Connectivity,
    storage: Arc<dyn Storage>,
) -> SyncService {
    let monitor = ConnectivityMonitor::new();
    monitor.report(state);
    SyncService::builder(transport)
        .storage(storage)
        .monitor(monitor)
        .clock(Arc::new(FixedClock::new(1_700_000_000_000)))
        .engine_config(EngineConfig::default())
        .build()
}
