// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! SQLite-backed pref store.

use std::collections::HashMap;
use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use serde_json::Value;
use tracing::warn;

use super::{PrefStore, StoreError};

/// SQLite-based pref store.
///
/// Every value is kept JSON-encoded in a single `prefs` table. The whole
/// table is loaded into memory on open; writes update the database first
/// and the cache only once the write succeeded.
pub struct SqlitePrefStore {
    conn: Mutex<Connection>,
    cache: Mutex<HashMap<String, Value>>,
}

impl SqlitePrefStore {
    /// Opens or creates a pref database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Creates an in-memory pref database (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS prefs (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            )",
            [],
        )?;
        let cache = load_all(&conn)?;
        Ok(SqlitePrefStore {
            conn: Mutex::new(conn),
            cache: Mutex::new(cache),
        })
    }
}

impl PrefStore for SqlitePrefStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.cache.lock().get(key).cloned()
    }

    fn set_value(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(&value)?;
        self.conn.lock().execute(
            "INSERT OR REPLACE INTO prefs (key, value) VALUES (?1, ?2)",
            params![key, encoded],
        )?;
        self.cache.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn clear_value(&self, key: &str) -> Result<(), StoreError> {
        self.conn
            .lock()
            .execute("DELETE FROM prefs WHERE key = ?1", params![key])?;
        self.cache.lock().remove(key);
        Ok(())
    }
}

/// Reads every row, skipping values that are no longer valid JSON.
fn load_all(conn: &Connection) -> Result<HashMap<String, Value>, StoreError> {
    let mut stmt = conn.prepare("SELECT key, value FROM prefs")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut values = HashMap::new();
    for row in rows {
        let (key, encoded) = row?;
        match serde_json::from_str(&encoded) {
            Ok(value) => {
                values.insert(key, value);
            }
            Err(e) => warn!("Dropping unreadable pref {}: {}", key, e),
        }
    }
    Ok(values)
}
