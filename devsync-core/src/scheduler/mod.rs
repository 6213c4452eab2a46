// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sync Scheduling Module
//!
//! Decides when the next sync attempt happens.
//!
//! # Architecture
//!
//! - **Strategy**: steady periodic refresh, or aggressive recovery after a
//!   failure with short, jittered, escalating delays
//! - **SyncScheduler trait**: what the device manager needs from a scheduler
//! - **SyncRequest**: token handed out for each attempt; completing it tells
//!   the scheduler how the attempt went
//! - **RecurringSyncScheduler**: the clock-driven implementation
//! - **MockSyncScheduler**: scripted scheduler for tests
//!
//! The scheduler never calls into its delegate. The host drives it through
//! [`SyncScheduler::poll`] and [`SyncScheduler::force_sync`], and passes the
//! returned token to a [`SyncSchedulerDelegate`].

mod mock;
mod recurring;

pub use mock::{MockSchedulerCalls, MockSyncScheduler};
pub use recurring::RecurringSyncScheduler;

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::error;

/// Scheduling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    /// Fixed refresh period.
    PeriodicRefresh,
    /// Short base period growing with each consecutive failure.
    AggressiveRecovery,
}

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchedulerState {
    /// `start` has not been called.
    NotStarted,
    /// A timer is armed for the next attempt.
    WaitingForRefresh,
    /// A sync request is outstanding.
    SyncInProgress,
}

type CompletionFn = Box<dyn FnOnce(bool) + Send>;

/// Token for one outstanding sync attempt.
///
/// Completing the token consumes it, so it can be completed at most once.
/// A token dropped without being completed reports a failure, so the
/// scheduler never waits forever.
pub struct SyncRequest {
    on_complete: Option<CompletionFn>,
}

impl SyncRequest {
    /// Creates a token that runs `on_complete` with the attempt's outcome.
    pub fn new<F>(on_complete: F) -> Self
    where
        F: FnOnce(bool) + Send + 'static,
    {
        SyncRequest {
            on_complete: Some(Box::new(on_complete)),
        }
    }

    /// Creates a token whose completion goes nowhere.
    pub fn detached() -> Self {
        Self::new(|_| {})
    }

    /// Reports the outcome of the attempt.
    pub fn on_did_complete(mut self, success: bool) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete(success);
        }
    }
}

impl Drop for SyncRequest {
    fn drop(&mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            error!("Sync request dropped without completion, reporting failure");
            on_complete(false);
        }
    }
}

impl fmt::Debug for SyncRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncRequest")
            .field("completed", &self.on_complete.is_none())
            .finish()
    }
}

/// Schedules recurring sync attempts.
pub trait SyncScheduler {
    /// Arms the first attempt.
    ///
    /// `elapsed_since_last_sync` shortens the first delay so that a restart
    /// does not push the next attempt back a whole period.
    fn start(&mut self, elapsed_since_last_sync: Duration, strategy: Strategy);

    /// Fires immediately, skipping the wait.
    ///
    /// Returns None if an attempt is already in progress or the scheduler
    /// was never started.
    fn force_sync(&mut self) -> Option<SyncRequest>;

    /// Fires if the next attempt is due.
    fn poll(&mut self) -> Option<SyncRequest>;

    /// Time until the next attempt; zero when none is armed.
    fn time_to_next_sync(&self) -> Duration;

    /// Current strategy.
    fn strategy(&self) -> Strategy;

    /// Current state.
    fn sync_state(&self) -> SchedulerState;
}

/// Receives fired sync attempts.
pub trait SyncSchedulerDelegate {
    /// Called with the token of each attempt the scheduler fires.
    fn on_sync_requested(&mut self, request: SyncRequest);
}
