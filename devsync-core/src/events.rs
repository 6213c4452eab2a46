// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Event System
//!
//! Observer notifications for device sync progress.

use std::sync::Arc;

use serde::Serialize;

/// Outcome of a sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncResult {
    /// The directory answered with a device list.
    Success,
    /// The directory reported an error.
    Failure,
}

/// Whether a sync changed the persisted unlock keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceChangeResult {
    /// The unlock key list differs from what was stored before.
    Changed,
    /// The unlock key list is identical to what was stored before.
    Unchanged,
}

/// Events emitted by the device manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A sync attempt started.
    Started,

    /// A sync attempt finished.
    Finished {
        /// Whether the attempt succeeded.
        result: SyncResult,
        /// Whether the unlock keys changed.
        change: DeviceChangeResult,
    },
}

/// Observer trait.
///
/// Implement this trait to follow sync progress.
pub trait SyncObserver: Send + Sync {
    /// Called when a sync attempt starts.
    fn on_sync_started(&self) {}

    /// Called when a sync attempt finishes.
    fn on_sync_finished(&self, _result: SyncResult, _change: DeviceChangeResult) {}
}

/// Simple callback-based observer.
///
/// Wraps a closure for easy event handling.
pub struct CallbackObserver<F>
where
    F: Fn(SyncEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackObserver<F>
where
    F: Fn(SyncEvent) + Send + Sync,
{
    /// Creates a new callback observer.
    pub fn new(callback: F) -> Self {
        CallbackObserver { callback }
    }
}

impl<F> SyncObserver for CallbackObserver<F>
where
    F: Fn(SyncEvent) + Send + Sync,
{
    fn on_sync_started(&self) {
        (self.callback)(SyncEvent::Started);
    }

    fn on_sync_finished(&self, result: SyncResult, change: DeviceChangeResult) {
        (self.callback)(SyncEvent::Finished { result, change });
    }
}

/// Ordered list of observers.
///
/// Notifications go out in registration order over a snapshot of the list,
/// so an observer may be removed while a notification is running.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Arc<dyn SyncObserver>>,
}

impl ObserverList {
    /// Creates an empty observer list.
    pub fn new() -> Self {
        ObserverList {
            observers: Vec::new(),
        }
    }

    /// Adds an observer. Adding the same observer twice is a no-op.
    pub fn add_observer(&mut self, observer: Arc<dyn SyncObserver>) {
        if !self.contains(&observer) {
            self.observers.push(observer);
        }
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn remove_observer(&mut self, observer: &Arc<dyn SyncObserver>) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| !Arc::ptr_eq(o, observer));
        self.observers.len() != before
    }

    /// Returns true if the observer is registered.
    pub fn contains(&self, observer: &Arc<dyn SyncObserver>) -> bool {
        self.observers.iter().any(|o| Arc::ptr_eq(o, observer))
    }

    /// Removes all observers.
    pub fn clear(&mut self) {
        self.observers.clear();
    }

    /// Returns the number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Notifies all observers that a sync started.
    pub fn notify_sync_started(&self) {
        for observer in self.snapshot() {
            observer.on_sync_started();
        }
    }

    /// Notifies all observers that a sync finished.
    pub fn notify_sync_finished(&self, result: SyncResult, change: DeviceChangeResult) {
        for observer in self.snapshot() {
            observer.on_sync_finished(result, change);
        }
    }

    fn snapshot(&self) -> Vec<Arc<dyn SyncObserver>> {
        self.observers.clone()
    }
}
