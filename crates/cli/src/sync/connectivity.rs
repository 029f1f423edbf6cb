// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network reachability tracking.
//!
//! [`ConnectivityMonitor`] holds the last known reachability signal and
//! broadcasts every signal it receives, repeats included. Signals come from
//! two places: a platform callback calling [`ConnectivityMonitor::report`],
//! or a [`Probe`] polled by [`ConnectivityMonitor::start`].
//!
//! Until the first signal arrives the monitor reports `Connected`, so the
//! first request is attempted rather than blocked; if that attempt fails
//! the interceptor re-checks before deciding to queue.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Capacity of the transition broadcast channel.
const EVENT_CAPACITY: usize = 64;

/// Reachability state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    Connected,
    Disconnected,
}

impl Connectivity {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            Connectivity::Connected
        } else {
            Connectivity::Disconnected
        }
    }

    pub fn is_connected(self) -> bool {
        self == Connectivity::Connected
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connectivity::Connected => f.write_str("connected"),
            Connectivity::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// Source of fresh reachability readings.
pub trait Probe: Send + Sync {
    /// Checks reachability now.
    fn check(&self) -> Pin<Box<dyn Future<Output = Connectivity> + Send + '_>>;
}

/// Reachability by opening a TCP connection to the backend.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    /// Probes `addr` (`host:port`).
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        TcpProbe {
            addr: addr.into(),
            timeout,
        }
    }

    /// Derives the probe address from an HTTP(S) URL.
    ///
    /// Returns `None` if the URL has no host.
    pub fn from_url(url: &str, timeout: Duration) -> Option<Self> {
        let parsed = reqwest::Url::parse(url).ok()?;
        let host = parsed.host_str()?;
        let port = parsed.port_or_known_default()?;
        // IPv6 hosts already come bracketed
        Some(TcpProbe::new(format!("{}:{}", host, port), timeout))
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

impl Probe for TcpProbe {
    fn check(&self) -> Pin<Box<dyn Future<Output = Connectivity> + Send + '_>> {
        Box::pin(async move {
            let connect = tokio::net::TcpStream::connect(self.addr.as_str());
            match tokio::time::timeout(self.timeout, connect).await {
                Ok(Ok(_)) => Connectivity::Connected,
                Ok(Err(e)) => {
                    tracing::debug!(addr = %self.addr, error = %e, "probe failed");
                    Connectivity::Disconnected
                }
                Err(_) => {
                    tracing::debug!(addr = %self.addr, "probe timed out");
                    Connectivity::Disconnected
                }
            }
        })
    }
}

struct MonitorInner {
    connected: AtomicBool,
    events: broadcast::Sender<Connectivity>,
    probe: Option<Arc<dyn Probe>>,
}

/// Shared handle to the current reachability state.
///
/// Cloning is cheap; all clones observe the same state.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<MonitorInner>,
}

impl ConnectivityMonitor {
    /// Creates a monitor fed only by [`report`](Self::report).
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Creates a monitor that can refresh itself from `probe`.
    pub fn with_probe(probe: Arc<dyn Probe>) -> Self {
        Self::build(Some(probe))
    }

    fn build(probe: Option<Arc<dyn Probe>>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        ConnectivityMonitor {
            inner: Arc::new(MonitorInner {
                connected: AtomicBool::new(true),
                events,
                probe,
            }),
        }
    }

    /// Last known state. May be stale between signals.
    pub fn current(&self) -> Connectivity {
        Connectivity::from_reachable(self.inner.connected.load(Ordering::Acquire))
    }

    pub fn is_connected(&self) -> bool {
        self.current().is_connected()
    }

    /// Records a reachability signal and notifies subscribers.
    ///
    /// Returns the previous state.
    pub fn report(&self, state: Connectivity) -> Connectivity {
        let previous = Connectivity::from_reachable(
            self.inner
                .connected
                .swap(state.is_connected(), Ordering::AcqRel),
        );
        if previous != state {
            tracing::info!(from = %previous, to = %state, "connectivity changed");
        } else {
            tracing::trace!(state = %state, "connectivity unchanged");
        }
        // No subscribers is fine
        let _ = self.inner.events.send(state);
        previous
    }

    /// Refreshes from the probe if there is one, otherwise returns the last
    /// known state.
    pub async fn check(&self) -> Connectivity {
        match &self.inner.probe {
            Some(probe) => {
                let state = probe.check().await;
                self.report(state);
                state
            }
            None => self.current(),
        }
    }

    /// Registers for every subsequent signal.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            rx: self.inner.events.subscribe(),
            token: CancellationToken::new(),
        }
    }

    /// Starts polling the probe: once immediately, then every `interval`.
    ///
    /// Without a probe the returned handle has no task and the monitor only
    /// changes through [`report`](Self::report).
    pub fn start(&self, interval: Duration) -> MonitorHandle {
        let token = CancellationToken::new();
        if self.inner.probe.is_none() {
            return MonitorHandle {
                token,
                handle: None,
            };
        }

        let monitor = self.clone();
        let cancel = token.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = monitor.check() => {}
                        }
                    }
                }
            }
            tracing::debug!("connectivity polling stopped");
        });

        MonitorHandle {
            token,
            handle: Some(handle),
        }
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Receives reachability signals until cancelled.
pub struct Subscription {
    rx: broadcast::Receiver<Connectivity>,
    token: CancellationToken,
}

impl Subscription {
    /// Waits for the next signal.
    ///
    /// Returns `None` once the subscription is cancelled or the monitor is
    /// gone. If the subscriber fell behind, missed signals are skipped and the
    /// oldest retained one is returned.
    pub async fn next(&mut self) -> Option<Connectivity> {
        loop {
            if self.token.is_cancelled() {
                return None;
            }
            tokio::select! {
                _ = self.token.cancelled() => return None,
                received = self.rx.recv() => match received {
                    Ok(state) => return Some(state),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "connectivity subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                },
            }
        }
    }

    /// Stops delivery. Pending and future signals are discarded.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Handle to the probe polling task. Dropping it stops polling.
pub struct MonitorHandle {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Stops polling and waits for the task to finish.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "connectivity polling task failed");
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
