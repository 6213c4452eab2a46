// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error Types
//!
//! Errors surfaced when building a device manager. Failed sync attempts are
//! never returned as errors; they are reported to observers instead.

use thiserror::Error;

use crate::store::StoreError;

/// Unified error type for device sync setup.
#[derive(Error, Debug)]
pub enum DeviceSyncError {
    /// Durable state could not be read or written.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration values are unusable.
    #[error("configuration error: {0}")]
    InvalidConfig(String),
}

/// Result type for device sync setup.
pub type DeviceSyncResult<T> = Result<T, DeviceSyncError>;
