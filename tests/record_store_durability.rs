//! Record Store Durability Tests
//!
//! Records written through one store instance are visible to a fresh
//! instance over the same root, and concurrent writers never expose a
//! partially written record.

use std::sync::Arc;
use std::thread;

use serde_json::json;
use tempfile::TempDir;

use orderdesk::store::{FileRecordStore, RecordStore, StoreError, COLLECTIONS, USERS};

// =============================================================================
// PERSISTENCE ACROSS INSTANCES
// =============================================================================

#[test]
fn test_records_survive_reopen() {
    let temp = TempDir::new().unwrap();

    {
        let store = FileRecordStore::new(temp.path());
        store.ensure_collections(&COLLECTIONS).unwrap();
        store
            .create(USERS, "a@b.com", &json!({"email": "a@b.com", "orders": []}))
            .unwrap();
        store
            .update(USERS, "a@b.com", &json!({"email": "a@b.com", "orders": ["x"]}))
            .unwrap();
    }

    let reopened = FileRecordStore::new(temp.path());
    assert_eq!(
        reopened.read(USERS, "a@b.com").unwrap(),
        json!({"email": "a@b.com", "orders": ["x"]})
    );
}

#[test]
fn test_no_staging_files_left_behind() {
    let temp = TempDir::new().unwrap();
    let store = FileRecordStore::new(temp.path());

    store.create(USERS, "a@b.com", &json!({"v": 1})).unwrap();
    store.update(USERS, "a@b.com", &json!({"v": 2})).unwrap();
    let _ = store.create(USERS, "a@b.com", &json!({"v": 3}));

    let entries: Vec<_> = std::fs::read_dir(temp.path().join(USERS))
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries, vec!["a@b.com.json".to_string()]);
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[test]
fn test_concurrent_updates_never_tear() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(FileRecordStore::new(temp.path()));
    let big = "x".repeat(64 * 1024);
    store
        .create(USERS, "a@b.com", &json!({"writer": 0, "payload": big}))
        .unwrap();

    let writers: Vec<_> = (1..=4)
        .map(|writer| {
            let store = Arc::clone(&store);
            let big = big.clone();
            thread::spawn(move || {
                for _ in 0..20 {
                    store
                        .update(USERS, "a@b.com", &json!({"writer": writer, "payload": big}))
                        .unwrap();
                }
            })
        })
        .collect();

    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            for _ in 0..100 {
                let value = store.read(USERS, "a@b.com").unwrap();
                assert_eq!(value["payload"].as_str().unwrap().len(), 64 * 1024);
            }
        })
    };

    for handle in writers {
        handle.join().unwrap();
    }
    reader.join().unwrap();
}

#[test]
fn test_create_delete_race_is_consistent() {
    let temp = TempDir::new().unwrap();
    let store = Arc::new(FileRecordStore::new(temp.path()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let created = store.create(USERS, "race@b.com", &json!({})).is_ok();
                let deleted = store.delete(USERS, "race@b.com").is_ok();
                (created, deleted)
            })
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let created = outcomes.iter().filter(|(c, _)| *c).count();
    let deleted = outcomes.iter().filter(|(_, d)| *d).count();

    // Every successful create is matched by exactly one successful delete
    assert_eq!(created, deleted);
    assert!(matches!(
        store.read(USERS, "race@b.com"),
        Err(StoreError::NotFound { .. })
    ));
}
