// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! In-memory pref store.

use std::collections::HashMap;

use parking_lot::Mutex;
use serde_json::Value;

use super::{PrefStore, StoreError};

/// Pref store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryPrefStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryPrefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl PrefStore for MemoryPrefStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.lock().get(key).cloned()
    }

    fn set_value(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn clear_value(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().remove(key);
        Ok(())
    }
}
