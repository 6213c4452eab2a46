// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Common Test Utilities
//!
//! Fixtures and helpers shared by the device sync integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use devsync_core::store::keys;
use devsync_core::*;
use parking_lot::Mutex;
use serde_json::{json, Value};

pub const INITIAL_TIME_NOW_SECONDS: f64 = 20_000_000.0;
pub const LATER_TIME_NOW_SECONDS: f64 = INITIAL_TIME_NOW_SECONDS + 30.0;
pub const LAST_SYNC_TIME_SECONDS: f64 = INITIAL_TIME_NOW_SECONDS - (60.0 * 60.0 * 5.0);

pub const STORED_PUBLIC_KEY: &str = "AAPL";
pub const STORED_DEVICE_NAME: &str = "iPhone 6";
pub const STORED_BLUETOOTH_ADDRESS: &str = "12:34:56:78:90:AB";

pub const PUBLIC_KEY_1: &str = "GOOG";
pub const DEVICE_NAME_1: &str = "Nexus 5";
pub const BLUETOOTH_ADDRESS_1: &str = "aa:bb:cc:ee:dd:ff";

pub const PUBLIC_KEY_2: &str = "MSFT";
pub const DEVICE_NAME_2: &str = "Surface Pro 3";

/// The unlock key stored before each test.
pub fn stored_unlock_key() -> Value {
    json!({
        "public_key": STORED_PUBLIC_KEY,
        "device_name": STORED_DEVICE_NAME,
        "bluetooth_address": STORED_BLUETOOTH_ADDRESS,
    })
}

/// One unlock key followed by one unlockable device.
pub fn my_devices_response() -> ListDevicesResponse {
    ListDevicesResponse {
        devices: vec![
            DeviceRecord::new_unlock_key(PUBLIC_KEY_1, DEVICE_NAME_1, BLUETOOTH_ADDRESS_1),
            DeviceRecord {
                public_key: PUBLIC_KEY_2.to_string(),
                friendly_device_name: DEVICE_NAME_2.to_string(),
                bluetooth_address: String::new(),
                unlock_key: false,
                unlockable: true,
            },
        ],
    }
}

/// Store holding a previous successful sync with one unlock key.
pub fn create_seeded_store() -> MemoryPrefStore {
    let store = MemoryPrefStore::new();
    store
        .set_value(keys::IS_RECOVERING_FROM_FAILURE, Value::Bool(false))
        .unwrap();
    store
        .set_value(keys::LAST_SYNC_TIME_SECONDS, json!(LAST_SYNC_TIME_SECONDS))
        .unwrap();
    store
        .set_value(
            keys::INVOCATION_REASON,
            json!(InvocationReason::Unknown.code()),
        )
        .unwrap();
    store
        .set_value(keys::UNLOCK_KEYS, json!([stored_unlock_key()]))
        .unwrap();
    store
}

pub fn create_test_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::from_secs_f64(INITIAL_TIME_NOW_SECONDS))
}

/// Builds a manager wired to mocks the test keeps handles to.
pub fn create_test_manager<'a>(
    store: &'a MemoryPrefStore,
    clock: &Arc<ManualClock>,
    directory: &MockDirectoryClientFactory,
    scheduler: &MockSyncScheduler,
) -> DeviceManager<'a> {
    DeviceManagerBuilder::new(store, directory.clone())
        .clock(clock.clone())
        .scheduler(scheduler.clone())
        .build()
        .unwrap()
}

/// Asserts the cached list and the persisted list both hold `expected`.
pub fn assert_unlock_keys_match(
    expected: &[DeviceRecord],
    manager: &DeviceManager<'_>,
    store: &dyn PrefStore,
) {
    let unlock_keys = manager.device_list();
    assert_eq!(expected.len(), unlock_keys.len());
    for (expected, actual) in expected.iter().zip(unlock_keys) {
        assert_eq!(expected.public_key, actual.public_key);
        assert_eq!(expected.friendly_device_name, actual.friendly_device_name);
        assert_eq!(expected.bluetooth_address, actual.bluetooth_address);
        assert!(actual.unlock_key);
        assert!(!actual.unlockable);
    }

    let persisted = SyncPrefs::new(store).unlock_keys();
    assert_eq!(expected.len(), persisted.len());
    for (expected, entry) in expected.iter().zip(&persisted) {
        assert_eq!(entry["public_key"], json!(expected.public_key));
        assert_eq!(entry["device_name"], json!(expected.friendly_device_name));
        assert_eq!(entry["bluetooth_address"], json!(expected.bluetooth_address));
    }
}

/// Observer that records every event it sees.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SyncEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl SyncObserver for RecordingObserver {
    fn on_sync_started(&self) {
        self.events.lock().push(SyncEvent::Started);
    }

    fn on_sync_finished(&self, result: SyncResult, change: DeviceChangeResult) {
        self.events
            .lock()
            .push(SyncEvent::Finished { result, change });
    }
}

/// Store that rejects writes to one chosen key.
pub struct FailingWritePrefStore {
    inner: MemoryPrefStore,
    failing_key: Mutex<Option<String>>,
}

impl FailingWritePrefStore {
    pub fn new(inner: MemoryPrefStore) -> Self {
        FailingWritePrefStore {
            inner,
            failing_key: Mutex::new(None),
        }
    }

    pub fn fail_writes_to(&self, key: &str) {
        *self.failing_key.lock() = Some(key.to_string());
    }
}

impl PrefStore for FailingWritePrefStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.inner.get_value(key)
    }

    fn set_value(&self, key: &str, value: Value) -> Result<(), StoreError> {
        if self.failing_key.lock().as_deref() == Some(key) {
            let error = serde_json::from_str::<Value>("{").unwrap_err();
            return Err(StoreError::Serialization(error));
        }
        self.inner.set_value(key, value)
    }

    fn clear_value(&self, key: &str) -> Result<(), StoreError> {
        self.inner.clear_value(key)
    }
}
