// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Request interceptor: sends requests and queues writes that fail offline.
//!
//! Only a genuine offline condition queues a request. All three must hold:
//! the request got no response at all, the method is state-changing, and
//! the connectivity monitor confirms we are disconnected. A server that
//! answers with an error status, or a transport failure while the monitor
//! still reports a connection, is handed back to the caller unchanged.

use std::sync::Arc;

use sq_core::{ClockSource, QueueRecord, RequestDescriptor};

use super::connectivity::ConnectivityMonitor;
use super::credentials::CredentialSource;
use super::error::SyncResult;
use super::transport::{HttpResponse, OutgoingRequest, Transport};
use super::SharedQueue;

/// Result of an intercepted request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The server responded (with any status).
    Completed(HttpResponse),
    /// No response while offline; the request was accepted for later sync.
    Queued(QueueRecord),
}

/// Wraps outgoing requests with credential attachment and offline queuing.
pub struct Interceptor {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
    monitor: ConnectivityMonitor,
    queue: SharedQueue,
    clock: Arc<dyn ClockSource>,
}

impl Interceptor {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialSource>,
        monitor: ConnectivityMonitor,
        queue: SharedQueue,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        Interceptor {
            transport,
            credentials,
            monitor,
            queue,
            clock,
        }
    }

    /// Sends `request`, queuing it instead of failing when offline.
    pub async fn execute(&self, request: RequestDescriptor) -> SyncResult<Outcome> {
        let outgoing = OutgoingRequest {
            request: request.clone(),
            bearer: self.credentials.bearer_token(),
        };

        match self.transport.send(outgoing).await {
            Ok(response) => Ok(Outcome::Completed(response)),
            Err(e) if e.is_network() && request.method.is_queueable() => {
                match self.enqueue_if_offline(request).await? {
                    Some(record) => Ok(Outcome::Queued(record)),
                    None => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Queues `request` if the monitor reports no connection.
    ///
    /// Returns the stored record, or `None` if we are connected and nothing
    /// was queued.
    pub async fn enqueue_if_offline(
        &self,
        request: RequestDescriptor,
    ) -> SyncResult<Option<QueueRecord>> {
        if self.monitor.check().await.is_connected() {
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                "connected, not queuing"
            );
            return Ok(None);
        }

        let record = QueueRecord::new(request, self.clock.now_ms())?;
        self.queue.lock().await?.enqueue(record.clone())?;
        tracing::info!(
            id = %record.id,
            method = %record.request.method,
            path = %record.request.path,
            "offline, queued request for later sync"
        );
        Ok(Some(record))
    }
}

#[cfg(test)]
#[path = "interceptor_tests.rs"]
mod tests;
