// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Typed access to the device sync prefs.

use serde_json::Value;

use super::{PrefStore, StoreError};
use crate::device::InvocationReason;

/// Keys of the registered device sync prefs.
pub mod keys {
    /// Seconds since the Unix epoch of the last successful sync; 0 if never.
    pub const LAST_SYNC_TIME_SECONDS: &str = "device_sync.last_sync_time_seconds";
    /// Set after a failed attempt, cleared by the next success.
    pub const IS_RECOVERING_FROM_FAILURE: &str = "device_sync.is_recovering_from_failure";
    /// Reason to report for the next attempt, as an integer code.
    pub const INVOCATION_REASON: &str = "device_sync.invocation_reason";
    /// Ordered list of unlock key dictionaries.
    pub const UNLOCK_KEYS: &str = "device_sync.unlock_keys";
}

/// Typed view over the four device sync prefs.
///
/// Missing or mistyped values read as their registered default.
#[derive(Clone, Copy)]
pub struct SyncPrefs<'a> {
    store: &'a dyn PrefStore,
}

impl<'a> SyncPrefs<'a> {
    pub fn new(store: &'a dyn PrefStore) -> Self {
        SyncPrefs { store }
    }

    /// Writes the default value of every pref that is not stored yet.
    pub fn register_defaults(&self) -> Result<(), StoreError> {
        let defaults = [
            (keys::LAST_SYNC_TIME_SECONDS, Value::from(0.0)),
            (keys::IS_RECOVERING_FROM_FAILURE, Value::Bool(false)),
            (
                keys::INVOCATION_REASON,
                Value::from(InvocationReason::Unknown.code()),
            ),
            (keys::UNLOCK_KEYS, Value::Array(Vec::new())),
        ];
        for (key, value) in defaults {
            if !self.store.contains(key) {
                self.store.set_value(key, value)?;
            }
        }
        Ok(())
    }

    pub fn last_sync_time_seconds(&self) -> f64 {
        self.store
            .get_value(keys::LAST_SYNC_TIME_SECONDS)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    pub fn set_last_sync_time_seconds(&self, secs: f64) -> Result<(), StoreError> {
        self.store
            .set_value(keys::LAST_SYNC_TIME_SECONDS, Value::from(secs))
    }

    pub fn is_recovering_from_failure(&self) -> bool {
        self.store
            .get_value(keys::IS_RECOVERING_FROM_FAILURE)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn set_recovering_from_failure(&self, recovering: bool) -> Result<(), StoreError> {
        self.store
            .set_value(keys::IS_RECOVERING_FROM_FAILURE, Value::Bool(recovering))
    }

    /// Raw integer code; may be outside the known reasons.
    pub fn invocation_reason_code(&self) -> i64 {
        self.store
            .get_value(keys::INVOCATION_REASON)
            .and_then(|v| v.as_i64())
            .unwrap_or_else(|| InvocationReason::Unknown.code())
    }

    pub fn set_invocation_reason(&self, reason: InvocationReason) -> Result<(), StoreError> {
        self.store
            .set_value(keys::INVOCATION_REASON, Value::from(reason.code()))
    }

    /// Stored unlock key entries, unvalidated.
    pub fn unlock_keys(&self) -> Vec<Value> {
        match self.store.get_value(keys::UNLOCK_KEYS) {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        }
    }

    pub fn set_unlock_keys(&self, entries: Vec<Value>) -> Result<(), StoreError> {
        self.store.set_value(keys::UNLOCK_KEYS, Value::Array(entries))
    }
}
