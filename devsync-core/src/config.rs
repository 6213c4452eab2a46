// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration for the device sync manager

use std::time::Duration;

use crate::error::{DeviceSyncError, DeviceSyncResult};

/// Longest refresh or recovery period a scheduler accepts.
pub const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Configuration for device syncing
#[derive(Debug, Clone)]
pub struct DeviceSyncConfig {
    /// Normal period between successful syncs
    pub refresh_period: Duration,

    /// First retry delay after a failure; doubles with each further failure
    pub base_recovery_period: Duration,

    /// Bound on the random jitter applied to every delay, as a fraction of it
    pub max_jitter_ratio: f64,

    /// Name used in scheduler log lines
    pub scheduler_label: String,

    /// How often the driver checks for a response while a request is in flight
    pub response_poll_interval: Duration,
}

impl Default for DeviceSyncConfig {
    fn default() -> Self {
        Self {
            refresh_period: Duration::from_secs(24 * 60 * 60), // 24 hours
            base_recovery_period: Duration::from_secs(10 * 60), // 10 minutes
            max_jitter_ratio: 0.2,
            scheduler_label: "DeviceSync".to_string(),
            response_poll_interval: Duration::from_millis(250),
        }
    }
}

impl DeviceSyncConfig {
    /// Set the normal refresh period
    pub fn with_refresh_period(mut self, period: Duration) -> Self {
        self.refresh_period = period;
        self
    }

    /// Set the base recovery period
    pub fn with_base_recovery_period(mut self, period: Duration) -> Self {
        self.base_recovery_period = period;
        self
    }

    /// Set the jitter ratio (0 disables jitter)
    pub fn with_max_jitter_ratio(mut self, ratio: f64) -> Self {
        self.max_jitter_ratio = ratio;
        self
    }

    /// Set the scheduler label
    pub fn with_scheduler_label(mut self, label: impl Into<String>) -> Self {
        self.scheduler_label = label.into();
        self
    }

    /// Set the driver's in-flight poll interval
    pub fn with_response_poll_interval(mut self, interval: Duration) -> Self {
        self.response_poll_interval = interval;
        self
    }

    /// Check that the values can drive a scheduler
    pub fn validate(&self) -> DeviceSyncResult<()> {
        if self.refresh_period.is_zero() {
            return Err(DeviceSyncError::InvalidConfig(
                "refresh period must be non-zero".into(),
            ));
        }
        if self.base_recovery_period.is_zero() {
            return Err(DeviceSyncError::InvalidConfig(
                "base recovery period must be non-zero".into(),
            ));
        }
        if self.refresh_period > MAX_PERIOD {
            return Err(DeviceSyncError::InvalidConfig(format!(
                "refresh period {:?} exceeds {:?}",
                self.refresh_period, MAX_PERIOD
            )));
        }
        if self.base_recovery_period > MAX_PERIOD {
            return Err(DeviceSyncError::InvalidConfig(format!(
                "base recovery period {:?} exceeds {:?}",
                self.base_recovery_period, MAX_PERIOD
            )));
        }
        if !(0.0..=1.0).contains(&self.max_jitter_ratio) {
            return Err(DeviceSyncError::InvalidConfig(format!(
                "jitter ratio {} outside [0, 1]",
                self.max_jitter_ratio
            )));
        }
        if self.response_poll_interval.is_zero() {
            return Err(DeviceSyncError::InvalidConfig(
                "response poll interval must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
