// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Time source abstraction.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;
}

/// Clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<SystemTime>,
}

impl ManualClock {
    /// Creates a clock frozen at `now`.
    pub fn new(now: SystemTime) -> Self {
        ManualClock {
            now: Mutex::new(now),
        }
    }

    /// Creates a clock frozen at `secs` seconds after the Unix epoch.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self::new(from_secs_f64(secs))
    }

    /// Sets the current time.
    pub fn set(&self, now: SystemTime) {
        *self.now.lock() = now;
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock()
    }
}

/// Converts a time to fractional seconds since the Unix epoch.
/// Times before the epoch map to 0.
pub fn to_secs_f64(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Converts fractional seconds since the Unix epoch to a time.
/// Negative, non-finite and unrepresentable values map to the epoch.
pub fn from_secs_f64(secs: f64) -> SystemTime {
    try_from_secs_f64(secs).unwrap_or(UNIX_EPOCH)
}

/// Converts fractional seconds since the Unix epoch to a time.
/// Returns None for negative, non-finite and unrepresentable values.
pub fn try_from_secs_f64(secs: f64) -> Option<SystemTime> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .and_then(|since_epoch| UNIX_EPOCH.checked_add(since_epoch))
}
