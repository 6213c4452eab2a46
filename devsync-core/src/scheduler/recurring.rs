// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Clock-driven recurring scheduler with exponential recovery backoff.

use std::sync::{Arc, Weak};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::{SchedulerState, Strategy, SyncRequest, SyncScheduler};
use crate::clock::Clock;
use crate::config::DeviceSyncConfig;

/// Recurring scheduler.
///
/// Under periodic refresh every attempt is one refresh period after the
/// previous one. After a failure the scheduler switches to aggressive
/// recovery: the delay starts at the base recovery period and doubles with
/// each consecutive failure until it reaches the refresh period. Every delay
/// is jittered by up to `max_jitter_ratio` in either direction so that a
/// fleet of clients does not retry in lockstep.
///
/// # Example
///
/// ```ignore
/// let clock = Arc::new(SystemClock);
/// let mut scheduler = RecurringSyncScheduler::new(clock, &DeviceSyncConfig::default());
/// scheduler.start(Duration::ZERO, Strategy::AggressiveRecovery);
///
/// if let Some(request) = scheduler.poll() {
///     // ... run the sync ...
///     request.on_did_complete(true);
/// }
/// ```
pub struct RecurringSyncScheduler {
    core: Arc<Mutex<SchedulerCore>>,
}

struct SchedulerCore {
    clock: Arc<dyn Clock>,
    refresh_period: Duration,
    base_recovery_period: Duration,
    max_jitter_ratio: f64,
    label: String,
    rng: StdRng,
    strategy: Strategy,
    state: SchedulerState,
    failure_count: u32,
    /// Deadline of the armed timer, if any.
    next_sync_at: Option<SystemTime>,
}

impl RecurringSyncScheduler {
    /// Creates a scheduler using the periods of `config`.
    pub fn new(clock: Arc<dyn Clock>, config: &DeviceSyncConfig) -> Self {
        Self::with_rng(clock, config, StdRng::from_entropy())
    }

    /// Creates a scheduler with a seeded jitter source (for testing).
    pub fn with_seed(clock: Arc<dyn Clock>, config: &DeviceSyncConfig, seed: u64) -> Self {
        Self::with_rng(clock, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(clock: Arc<dyn Clock>, config: &DeviceSyncConfig, rng: StdRng) -> Self {
        let core = SchedulerCore {
            clock,
            refresh_period: config.refresh_period,
            base_recovery_period: config.base_recovery_period,
            max_jitter_ratio: config.max_jitter_ratio,
            label: config.scheduler_label.clone(),
            rng,
            strategy: Strategy::PeriodicRefresh,
            state: SchedulerState::NotStarted,
            failure_count: 0,
            next_sync_at: None,
        };
        RecurringSyncScheduler {
            core: Arc::new(Mutex::new(core)),
        }
    }

    /// Number of consecutive failures since the last success.
    pub fn failure_count(&self) -> u32 {
        self.core.lock().failure_count
    }

    /// Un-jittered period for the current strategy and failure count.
    pub fn current_period(&self) -> Duration {
        self.core.lock().period()
    }

    fn fire(&self, core: &mut SchedulerCore) -> SyncRequest {
        core.next_sync_at = None;
        core.state = SchedulerState::SyncInProgress;

        let weak: Weak<Mutex<SchedulerCore>> = Arc::downgrade(&self.core);
        SyncRequest::new(move |success| {
            if let Some(core) = weak.upgrade() {
                core.lock().on_sync_completed(success);
            }
        })
    }
}

impl SyncScheduler for RecurringSyncScheduler {
    fn start(&mut self, elapsed_since_last_sync: Duration, strategy: Strategy) {
        let mut core = self.core.lock();
        core.strategy = strategy;
        let delay = core
            .jittered_period()
            .saturating_sub(elapsed_since_last_sync);
        info!(
            "{}: starting with {:?}, first attempt in {:?}",
            core.label, strategy, delay
        );
        core.schedule_next_sync(delay);
    }

    fn force_sync(&mut self) -> Option<SyncRequest> {
        let mut core = self.core.lock();
        match core.state {
            SchedulerState::NotStarted => {
                warn!("{}: force sync before start, ignoring", core.label);
                None
            }
            SchedulerState::SyncInProgress => {
                warn!("{}: sync already in progress, ignoring force sync", core.label);
                None
            }
            SchedulerState::WaitingForRefresh => {
                info!("{}: forcing sync now", core.label);
                Some(self.fire(&mut core))
            }
        }
    }

    fn poll(&mut self) -> Option<SyncRequest> {
        let mut core = self.core.lock();
        if core.state != SchedulerState::WaitingForRefresh {
            return None;
        }
        let due = core.next_sync_at?;
        if core.clock.now() < due {
            return None;
        }
        match core.strategy {
            Strategy::PeriodicRefresh => {
                info!("{}: timer fired for periodic refresh", core.label)
            }
            Strategy::AggressiveRecovery => info!(
                "{}: timer fired for aggressive recovery (failures={})",
                core.label, core.failure_count
            ),
        }
        Some(self.fire(&mut core))
    }

    fn time_to_next_sync(&self) -> Duration {
        let core = self.core.lock();
        match core.next_sync_at {
            Some(due) => due
                .duration_since(core.clock.now())
                .unwrap_or(Duration::ZERO),
            None => Duration::ZERO,
        }
    }

    fn strategy(&self) -> Strategy {
        self.core.lock().strategy
    }

    fn sync_state(&self) -> SchedulerState {
        self.core.lock().state
    }
}

impl SchedulerCore {
    fn on_sync_completed(&mut self, success: bool) {
        if success {
            self.strategy = Strategy::PeriodicRefresh;
            self.failure_count = 0;
        } else {
            self.strategy = Strategy::AggressiveRecovery;
            self.failure_count = self.failure_count.saturating_add(1);
        }
        let delay = self.jittered_period();
        debug!(
            "{}: sync completed (success={}), next attempt in {:?}",
            self.label, success, delay
        );
        self.schedule_next_sync(delay);
    }

    fn schedule_next_sync(&mut self, delay: Duration) {
        self.next_sync_at = Some(self.clock.now() + delay);
        self.state = SchedulerState::WaitingForRefresh;
    }

    fn period(&self) -> Duration {
        match self.strategy {
            Strategy::PeriodicRefresh => self.refresh_period,
            Strategy::AggressiveRecovery if self.failure_count > 0 => {
                // Doubles per consecutive failure, capped at the refresh period.
                2u32.checked_pow(self.failure_count - 1)
                    .and_then(|factor| self.base_recovery_period.checked_mul(factor))
                    .map_or(self.refresh_period, |backoff| backoff.min(self.refresh_period))
            }
            Strategy::AggressiveRecovery => self.base_recovery_period,
        }
    }

    fn jittered_period(&mut self) -> Duration {
        let period = self.period();
        if self.max_jitter_ratio <= 0.0 {
            return period;
        }
        let jitter = self
            .rng
            .gen_range(-self.max_jitter_ratio..=self.max_jitter_ratio);
        period.mul_f64((1.0 + jitter).max(0.0))
    }
}
