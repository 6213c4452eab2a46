// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Scheduler
//!
//! Scripted scheduler for testing without real timers.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{SchedulerState, Strategy, SyncRequest, SyncScheduler};

/// Calls recorded by a [`MockSyncScheduler`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockSchedulerCalls {
    /// Arguments of every `start` call.
    pub start_calls: Vec<(Duration, Strategy)>,
    /// Number of `force_sync` calls.
    pub force_sync_calls: usize,
    /// Outcomes reported through tokens from this scheduler, in order.
    pub completions: Vec<bool>,
}

struct MockState {
    strategy: Strategy,
    state: SchedulerState,
    time_to_next_sync: Duration,
    fire_on_force: bool,
    fire_on_next_poll: bool,
    calls: MockSchedulerCalls,
}

/// Mock scheduler.
///
/// Clones share state, so a test can keep one handle while the device
/// manager owns another. Nothing fires unless the test asks for it: use
/// [`MockSyncScheduler::make_request`] to hand a token to the delegate
/// directly, or arm [`MockSyncScheduler::fire_on_next_poll`].
#[derive(Clone)]
pub struct MockSyncScheduler {
    inner: Arc<Mutex<MockState>>,
}

impl MockSyncScheduler {
    /// Creates a mock reporting periodic refresh and no scheduled attempt.
    pub fn new() -> Self {
        MockSyncScheduler {
            inner: Arc::new(Mutex::new(MockState {
                strategy: Strategy::PeriodicRefresh,
                state: SchedulerState::NotStarted,
                time_to_next_sync: Duration::ZERO,
                fire_on_force: false,
                fire_on_next_poll: false,
                calls: MockSchedulerCalls::default(),
            })),
        }
    }

    /// Sets the strategy reported to callers.
    pub fn set_strategy(&self, strategy: Strategy) {
        self.inner.lock().strategy = strategy;
    }

    /// Sets the state reported to callers.
    pub fn set_sync_state(&self, state: SchedulerState) {
        self.inner.lock().state = state;
    }

    /// Sets the time to next sync reported to callers.
    pub fn set_time_to_next_sync(&self, time: Duration) {
        self.inner.lock().time_to_next_sync = time;
    }

    /// Makes `force_sync` hand out a token instead of only recording the call.
    pub fn set_fire_on_force(&self, fire: bool) {
        self.inner.lock().fire_on_force = fire;
    }

    /// Makes the next `poll` hand out a token.
    pub fn fire_on_next_poll(&self) {
        self.inner.lock().fire_on_next_poll = true;
    }

    /// Creates a token whose completion is recorded by this mock.
    pub fn make_request(&self) -> SyncRequest {
        let inner = Arc::clone(&self.inner);
        SyncRequest::new(move |success| {
            let mut state = inner.lock();
            state.calls.completions.push(success);
            state.state = SchedulerState::WaitingForRefresh;
        })
    }

    /// Returns a snapshot of the recorded calls.
    pub fn calls(&self) -> MockSchedulerCalls {
        self.inner.lock().calls.clone()
    }

    fn fire(&self) -> SyncRequest {
        self.inner.lock().state = SchedulerState::SyncInProgress;
        self.make_request()
    }
}

impl Default for MockSyncScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncScheduler for MockSyncScheduler {
    fn start(&mut self, elapsed_since_last_sync: Duration, strategy: Strategy) {
        let mut state = self.inner.lock();
        state
            .calls
            .start_calls
            .push((elapsed_since_last_sync, strategy));
        state.state = SchedulerState::WaitingForRefresh;
    }

    fn force_sync(&mut self) -> Option<SyncRequest> {
        let fire = {
            let mut state = self.inner.lock();
            state.calls.force_sync_calls += 1;
            state.fire_on_force
        };
        fire.then(|| self.fire())
    }

    fn poll(&mut self) -> Option<SyncRequest> {
        let fire = std::mem::take(&mut self.inner.lock().fire_on_next_poll);
        fire.then(|| self.fire())
    }

    fn time_to_next_sync(&self) -> Duration {
        self.inner.lock().time_to_next_sync
    }

    fn strategy(&self) -> Strategy {
        self.inner.lock().strategy
    }

    fn sync_state(&self) -> SchedulerState {
        self.inner.lock().state
    }
}
