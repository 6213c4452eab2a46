// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for clock

use std::time::{Duration, UNIX_EPOCH};

use devsync_core::clock;

#[test]
fn test_seconds_conversion() {
    let time = clock::from_secs_f64(20_000_000.0);

    assert_eq!(time, UNIX_EPOCH + Duration::from_secs(20_000_000));
    assert_eq!(clock::to_secs_f64(time), 20_000_000.0);
}

#[test]
fn test_unrepresentable_seconds() {
    for secs in [-1.0, f64::NAN, f64::INFINITY, 1e19, 1e20] {
        assert_eq!(clock::try_from_secs_f64(secs), None, "{} should be rejected", secs);
        assert_eq!(clock::from_secs_f64(secs), UNIX_EPOCH);
    }
}
