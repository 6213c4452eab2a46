// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for store

use devsync_core::store::keys;
use devsync_core::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn exercise_store(store: &dyn PrefStore) {
    assert_eq!(store.get_value("missing"), None);
    assert!(!store.contains("missing"));

    store.set_value("number", json!(1.5)).unwrap();
    store.set_value("list", json!([{"a": 1}, "b"])).unwrap();
    assert_eq!(store.get_value("number"), Some(json!(1.5)));
    assert_eq!(store.get_value("list"), Some(json!([{"a": 1}, "b"])));

    store.set_value("number", json!(2.5)).unwrap();
    assert_eq!(store.get_value("number"), Some(json!(2.5)));

    store.clear_value("number").unwrap();
    assert!(!store.contains("number"));
    store.clear_value("never-set").unwrap();
}

#[test]
fn test_memory_store_basic_operations() {
    let store = MemoryPrefStore::new();
    assert!(store.is_empty());

    exercise_store(&store);

    assert_eq!(store.len(), 1);
}

#[test]
fn test_sqlite_store_basic_operations() {
    let store = SqlitePrefStore::in_memory().unwrap();

    exercise_store(&store);
}

#[test]
fn test_sqlite_store_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("prefs.db");

    {
        let store = SqlitePrefStore::open(&db_path).unwrap();
        let prefs = SyncPrefs::new(&store);
        prefs.register_defaults().unwrap();
        prefs.set_last_sync_time_seconds(19_982_000.0).unwrap();
        prefs.set_recovering_from_failure(true).unwrap();
        prefs.set_invocation_reason(InvocationReason::Manual).unwrap();
        prefs
            .set_unlock_keys(vec![json!({
                "public_key": "GOOG",
                "device_name": "Nexus 5",
                "bluetooth_address": "",
            })])
            .unwrap();
    }

    let store = SqlitePrefStore::open(&db_path).unwrap();
    let prefs = SyncPrefs::new(&store);
    assert_eq!(prefs.last_sync_time_seconds(), 19_982_000.0);
    assert!(prefs.is_recovering_from_failure());
    assert_eq!(prefs.invocation_reason_code(), 13);
    assert_eq!(prefs.unlock_keys().len(), 1);
    assert_eq!(prefs.unlock_keys()[0]["public_key"], json!("GOOG"));
}

#[test]
fn test_sqlite_store_skips_unreadable_rows() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("prefs.db");

    {
        let store = SqlitePrefStore::open(&db_path).unwrap();
        store.set_value("good", json!(true)).unwrap();
    }
    {
        let conn = rusqlite::Connection::open(&db_path).unwrap();
        conn.execute(
            "INSERT INTO prefs (key, value) VALUES ('bad', '{not json')",
            [],
        )
        .unwrap();
    }

    let store = SqlitePrefStore::open(&db_path).unwrap();
    assert_eq!(store.get_value("good"), Some(json!(true)));
    assert_eq!(store.get_value("bad"), None);
}

#[test]
fn test_sync_prefs_defaults_when_missing() {
    let store = MemoryPrefStore::new();
    let prefs = SyncPrefs::new(&store);

    assert_eq!(prefs.last_sync_time_seconds(), 0.0);
    assert!(!prefs.is_recovering_from_failure());
    assert_eq!(prefs.invocation_reason_code(), 0);
    assert!(prefs.unlock_keys().is_empty());
}

#[test]
fn test_sync_prefs_defaults_when_mistyped() {
    let store = MemoryPrefStore::new();
    store
        .set_value(keys::LAST_SYNC_TIME_SECONDS, json!("yesterday"))
        .unwrap();
    store
        .set_value(keys::IS_RECOVERING_FROM_FAILURE, json!(1))
        .unwrap();
    store.set_value(keys::INVOCATION_REASON, json!(null)).unwrap();
    store
        .set_value(keys::UNLOCK_KEYS, json!({"not": "a list"}))
        .unwrap();
    let prefs = SyncPrefs::new(&store);

    assert_eq!(prefs.last_sync_time_seconds(), 0.0);
    assert!(!prefs.is_recovering_from_failure());
    assert_eq!(prefs.invocation_reason_code(), 0);
    assert!(prefs.unlock_keys().is_empty());
}

#[test]
fn test_register_defaults_keeps_existing_values() {
    let store = MemoryPrefStore::new();
    store
        .set_value(keys::IS_RECOVERING_FROM_FAILURE, Value::Bool(true))
        .unwrap();
    let prefs = SyncPrefs::new(&store);

    prefs.register_defaults().unwrap();

    assert_eq!(store.len(), 4);
    assert!(prefs.is_recovering_from_failure());
    assert_eq!(store.get_value(keys::UNLOCK_KEYS), Some(json!([])));
}
