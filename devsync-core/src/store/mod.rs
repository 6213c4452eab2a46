// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Durable State Module
//!
//! Key/value storage for the sync state that has to survive restarts.
//! Values are JSON so that list and dictionary entries can be stored as-is
//! and validated when read back.

mod memory;
mod prefs;
mod sqlite;

pub use memory::MemoryPrefStore;
pub use prefs::{keys, SyncPrefs};
pub use sqlite::SqlitePrefStore;

use serde_json::Value;
use thiserror::Error;

/// Store error types.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for durable key/value state.
///
/// Reads are served from memory; writes go through to the backing store
/// before returning.
pub trait PrefStore {
    /// Returns the value stored under `key`, if any.
    fn get_value(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set_value(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Removes the value stored under `key`.
    fn clear_value(&self, key: &str) -> Result<(), StoreError>;

    /// Checks if a value is stored under `key`.
    fn contains(&self, key: &str) -> bool {
        self.get_value(key).is_some()
    }
}
