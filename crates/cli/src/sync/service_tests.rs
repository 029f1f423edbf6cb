// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use super::*;
use crate::sync::test_helpers::{
    attendance_request, make_service, make_service_with, MockReply, MockTransport,
};
use sq_core::FileStorage;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn default_builder_is_usable() {
    let service = SyncService::builder(Arc::new(MockTransport::ok())).build();

    let outcome = service.execute(attendance_request(1)).await.unwrap();

    assert!(matches!(outcome, Outcome::Completed(_)));
    assert_eq!(service.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn status_reflects_queue_and_connectivity() {
    let transport = Arc::new(MockTransport::offline());
    let (service, _) = make_service(transport, Connectivity::Disconnected);

    service.execute(attendance_request(1)).await.unwrap();
    service.execute(attendance_request(2)).await.unwrap();

    let status = service.status().await.unwrap();
    assert_eq!(
        status,
        SyncStatus {
            connectivity: Connectivity::Disconnected,
            syncing: false,
            pending: 2,
            dropped: 0,
        }
    );
}

#[tokio::test]
async fn offline_then_online_round_trip() {
    let transport = Arc::new(MockTransport::offline());
    let (service, _) = make_service(transport.clone(), Connectivity::Disconnected);

    service.execute(attendance_request(1)).await.unwrap();
    assert_eq!(service.pending_count().await.unwrap(), 1);

    transport.set_fallback(MockReply::Status(201));
    service.monitor().report(Connectivity::Connected);
    let outcome = service.trigger_sync().await.unwrap();

    let DrainOutcome::Completed(report) = outcome else { panic!("skipped: {:?}", outcome) };
    assert_eq!(report.synced, 1);
    assert_eq!(service.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn dropped_records_land_in_dead_letters() {
    let transport = Arc::new(MockTransport::offline());
    let (service, _) = make_service(transport, Connectivity::Disconnected);
    service.execute(attendance_request(1)).await.unwrap();
    service.monitor().report(Connectivity::Connected);

    for _ in 0..4 {
        service.trigger_sync().await.unwrap();
    }

    assert_eq!(service.pending_count().await.unwrap(), 0);
    assert_eq!(service.dead_letters().await.unwrap().len(), 1);
    assert_eq!(service.status().await.unwrap().dropped, 1);

    service.clear_dead_letters().await.unwrap();
    assert!(service.dead_letters().await.unwrap().is_empty());
}

#[tokio::test]
async fn clear_discards_pending() {
    let transport = Arc::new(MockTransport::offline());
    let (service, _) = make_service(transport, Connectivity::Disconnected);
    service.execute(attendance_request(1)).await.unwrap();

    service.clear().await.unwrap();

    assert!(service.pending().await.unwrap().is_empty());
}

#[tokio::test]
async fn queue_survives_restart() {
    let dir = TempDir::new().unwrap();
    let transport = Arc::new(MockTransport::offline());

    let first = make_service_with(
        transport.clone(),
        Connectivity::Disconnected,
        Arc::new(FileStorage::open(dir.path()).unwrap()),
    );
    first.execute(attendance_request(1)).await.unwrap();
    let queued = first.pending().await.unwrap();
    drop(first);

    transport.set_fallback(MockReply::Status(200));
    let second = make_service_with(
        transport.clone(),
        Connectivity::Connected,
        Arc::new(FileStorage::open(dir.path()).unwrap()),
    );
    assert_eq!(second.pending().await.unwrap(), queued);

    second.trigger_sync().await.unwrap();
    assert_eq!(second.pending_count().await.unwrap(), 0);
    assert_eq!(transport.sent().last().unwrap().request, queued[0].request);
}

fn service_in(dir: &Path, transport: Arc<MockTransport>, state: Connectivity) -> SyncService {
    let monitor = ConnectivityMonitor::new();
    monitor.report(state);
    SyncService::builder(transport)
        .storage(Arc::new(FileStorage::open(&dir.join("queue")).unwrap()))
        .monitor(monitor)
        .engine_config(EngineConfig {
            max_retries: 3,
            lock_path: Some(dir.join("drain.lock")),
        })
        .lock_dir(dir.to_path_buf())
        .build()
}

#[tokio::test]
async fn enqueue_from_other_service_during_drain_is_kept() {
    let dir = TempDir::new().unwrap();
    let replay = Arc::new(MockTransport::ok().with_delay(Duration::from_millis(100)));
    let draining = Arc::new(service_in(dir.path(), replay.clone(), Connectivity::Connected));
    let sending = service_in(
        dir.path(),
        Arc::new(MockTransport::offline()),
        Connectivity::Disconnected,
    );

    let first = match sending.execute(attendance_request(1)).await.unwrap() {
        Outcome::Queued(record) => record,
        other => panic!("expected queued, got {:?}", other),
    };

    let drain = tokio::spawn({
        let draining = Arc::clone(&draining);
        async move { draining.trigger_sync().await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = match sending.execute(attendance_request(2)).await.unwrap() {
        Outcome::Queued(record) => record,
        other => panic!("expected queued, got {:?}", other),
    };

    let outcome = drain.await.unwrap().unwrap();
    let DrainOutcome::Completed(report) = outcome else {
        panic!("drain skipped: {:?}", outcome);
    };
    assert_eq!(report.synced, 1);
    assert_eq!(replay.sent()[0].request, first.request);
    assert_eq!(sending.pending().await.unwrap(), vec![second]);
    assert!(dir.path().join("sync_queue.lock").exists());
}
