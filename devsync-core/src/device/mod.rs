// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Device Module
//!
//! Device records, invocation reasons, and the manager that keeps the
//! persisted unlock keys in sync with the remote directory.

mod manager;
mod reason;
mod record;

pub use manager::{DeviceManager, DeviceManagerBuilder, DeviceSyncStatus};
pub use reason::InvocationReason;
pub use record::{unlock_keys_to_pref_values, DeviceRecord};
