// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for config

use std::time::Duration;

use devsync_core::*;

#[test]
fn test_default_config() {
    let config = DeviceSyncConfig::default();

    assert_eq!(config.refresh_period, Duration::from_secs(24 * 60 * 60));
    assert_eq!(config.base_recovery_period, Duration::from_secs(10 * 60));
    assert_eq!(config.max_jitter_ratio, 0.2);
    assert_eq!(config.scheduler_label, "DeviceSync");
    assert_eq!(config.response_poll_interval, Duration::from_millis(250));
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_builder_methods() {
    let config = DeviceSyncConfig::default()
        .with_refresh_period(Duration::from_secs(3600))
        .with_base_recovery_period(Duration::from_secs(30))
        .with_max_jitter_ratio(0.0)
        .with_scheduler_label("TestSync")
        .with_response_poll_interval(Duration::from_millis(10));

    assert_eq!(config.refresh_period, Duration::from_secs(3600));
    assert_eq!(config.base_recovery_period, Duration::from_secs(30));
    assert_eq!(config.max_jitter_ratio, 0.0);
    assert_eq!(config.scheduler_label, "TestSync");
    assert_eq!(config.response_poll_interval, Duration::from_millis(10));
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_unusable_values() {
    let invalid = [
        DeviceSyncConfig::default().with_refresh_period(Duration::ZERO),
        DeviceSyncConfig::default().with_base_recovery_period(Duration::ZERO),
        DeviceSyncConfig::default().with_max_jitter_ratio(-0.1),
        DeviceSyncConfig::default().with_max_jitter_ratio(f64::NAN),
        DeviceSyncConfig::default().with_response_poll_interval(Duration::ZERO),
        DeviceSyncConfig::default().with_refresh_period(Duration::MAX),
        DeviceSyncConfig::default().with_base_recovery_period(Duration::from_secs(u64::MAX)),
    ];

    for config in invalid {
        let result = config.validate();
        assert!(
            matches!(result, Err(DeviceSyncError::InvalidConfig(_))),
            "{:?} should be rejected",
            config
        );
    }
}

#[test]
fn test_config_error_message() {
    let err = DeviceSyncConfig::default()
        .with_max_jitter_ratio(2.0)
        .validate()
        .unwrap_err();

    assert_eq!(err.to_string(), "configuration error: jitter ratio 2 outside [0, 1]");
}

#[test]
fn test_validate_accepts_longest_period() {
    let config = DeviceSyncConfig::default()
        .with_refresh_period(config::MAX_PERIOD)
        .with_base_recovery_period(config::MAX_PERIOD);

    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_period_past_limit() {
    let config = DeviceSyncConfig::default()
        .with_refresh_period(config::MAX_PERIOD + Duration::from_secs(1));

    assert!(matches!(
        config.validate(),
        Err(DeviceSyncError::InvalidConfig(_))
    ));
}
