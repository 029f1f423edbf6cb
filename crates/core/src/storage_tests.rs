// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::tempdir;
use yare::parameterized;

#[parameterized(
    plain = { "sync_queue", true },
    dashed = { "sync-dead-letters", true },
    digits = { "queue2", true },
    empty = { "", false },
    dot_dot = { "../escape", false },
    slash = { "a/b", false },
    space = { "a b", false },
)]
fn key_validation(key: &str, valid: bool) {
    assert_eq!(validate_key(key).is_ok(), valid);
}

#[test]
fn file_storage_missing_key_is_none() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    assert_eq!(storage.get("sync_queue").unwrap(), None);
}

#[test]
fn file_storage_set_get_overwrite() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();

    storage.set("sync_queue", "[1]").unwrap();
    assert_eq!(storage.get("sync_queue").unwrap().as_deref(), Some("[1]"));

    storage.set("sync_queue", "[1,2]").unwrap();
    assert_eq!(storage.get("sync_queue").unwrap().as_deref(), Some("[1,2]"));

    // No temp file left behind
    assert!(!dir.path().join("sync_queue.json.tmp").exists());
}

#[test]
fn file_storage_remove_is_idempotent() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();

    storage.set("sync_queue", "[]").unwrap();
    storage.remove("sync_queue").unwrap();
    storage.remove("sync_queue").unwrap();
    assert_eq!(storage.get("sync_queue").unwrap(), None);
}

#[test]
fn file_storage_persists_across_instances() {
    let dir = tempdir().unwrap();
    {
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set("sync_queue", "[\"a\"]").unwrap();
    }
    let storage = FileStorage::open(dir.path()).unwrap();
    assert_eq!(storage.get("sync_queue").unwrap().as_deref(), Some("[\"a\"]"));
}

#[test]
fn file_storage_creates_nested_directory() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let storage = FileStorage::open(&nested).unwrap();
    storage.set("k", "v").unwrap();
    assert!(nested.join("k.json").exists());
}

#[test]
fn file_storage_rejects_bad_key() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    assert!(matches!(storage.set("../x", "v"), Err(Error::InvalidKey(_))));
}

#[test]
fn memory_storage_round_trip() {
    let storage = MemoryStorage::new();
    assert_eq!(storage.get("k").unwrap(), None);
    storage.set("k", "v").unwrap();
    assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    storage.remove("k").unwrap();
    assert_eq!(storage.get("k").unwrap(), None);
}
