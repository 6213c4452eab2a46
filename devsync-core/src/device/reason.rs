// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Invocation reasons reported with each sync request.

use serde::{Deserialize, Serialize};

/// Why a sync attempt was made.
///
/// The integer codes are persisted and sent to the directory; they must not
/// be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvocationReason {
    Unknown,
    Initialization,
    Periodic,
    SlowPeriodic,
    FastPeriodic,
    Expiration,
    FailureRecovery,
    NewAccount,
    ChangedAccount,
    FeatureToggled,
    ServerInitiated,
    AddressChange,
    SoftwareUpdate,
    Manual,
}

impl InvocationReason {
    /// Stable integer code.
    pub fn code(self) -> i64 {
        match self {
            InvocationReason::Unknown => 0,
            InvocationReason::Initialization => 1,
            InvocationReason::Periodic => 2,
            InvocationReason::SlowPeriodic => 3,
            InvocationReason::FastPeriodic => 4,
            InvocationReason::Expiration => 5,
            InvocationReason::FailureRecovery => 6,
            InvocationReason::NewAccount => 7,
            InvocationReason::ChangedAccount => 8,
            InvocationReason::FeatureToggled => 9,
            InvocationReason::ServerInitiated => 10,
            InvocationReason::AddressChange => 11,
            InvocationReason::SoftwareUpdate => 12,
            InvocationReason::Manual => 13,
        }
    }

    /// Parses a stored code. Returns None for unknown codes.
    pub fn from_code(code: i64) -> Option<Self> {
        let reason = match code {
            0 => InvocationReason::Unknown,
            1 => InvocationReason::Initialization,
            2 => InvocationReason::Periodic,
            3 => InvocationReason::SlowPeriodic,
            4 => InvocationReason::FastPeriodic,
            5 => InvocationReason::Expiration,
            6 => InvocationReason::FailureRecovery,
            7 => InvocationReason::NewAccount,
            8 => InvocationReason::ChangedAccount,
            9 => InvocationReason::FeatureToggled,
            10 => InvocationReason::ServerInitiated,
            11 => InvocationReason::AddressChange,
            12 => InvocationReason::SoftwareUpdate,
            13 => InvocationReason::Manual,
            _ => return None,
        };
        Some(reason)
    }
}
