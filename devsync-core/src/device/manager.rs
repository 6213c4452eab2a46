// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Device Manager
//!
//! Orchestrates device syncing: decides why each attempt happens, reconciles
//! directory responses into the persisted unlock keys, and feeds outcomes
//! back to the scheduler and to observers.

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, error, info, warn};

use super::reason::InvocationReason;
use super::record::{unlock_keys_to_pref_values, DeviceRecord};
use crate::clock::{self, Clock, SystemClock};
use crate::config::DeviceSyncConfig;
use crate::directory::{
    DirectoryClient, DirectoryClientFactory, DirectoryError, ListDevicesOutcome,
    ListDevicesRequest, ListDevicesResponder, ListDevicesResponse,
};
use crate::error::DeviceSyncResult;
use crate::events::{DeviceChangeResult, ObserverList, SyncObserver, SyncResult};
use crate::scheduler::{
    RecurringSyncScheduler, SchedulerState, Strategy, SyncRequest, SyncScheduler,
    SyncSchedulerDelegate,
};
use crate::store::{PrefStore, StoreError, SyncPrefs};

/// Snapshot of the sync state for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSyncStatus {
    /// Seconds since the Unix epoch of the last successful sync.
    pub last_sync_time_seconds: Option<f64>,
    /// Milliseconds until the next scheduled attempt.
    pub time_to_next_attempt_ms: u64,
    /// Whether the scheduler is in recovery mode.
    pub is_recovering_from_failure: bool,
    /// Whether a request is outstanding.
    pub is_sync_in_progress: bool,
    /// Number of cached unlock keys.
    pub unlock_key_count: usize,
}

/// The one outstanding attempt.
struct InFlightSync {
    request: SyncRequest,
    client: Box<dyn DirectoryClient>,
    receiver: oneshot::Receiver<ListDevicesOutcome>,
    invocation_reason: InvocationReason,
}

/// Keeps the persisted list of unlock keys fresh.
///
/// All methods run on one thread. The only asynchrony is the directory
/// round-trip: a request is issued from [`DeviceManager::on_sync_requested`]
/// and its answer is picked up by a later [`DeviceManager::poll`].
///
/// # Example
///
/// ```ignore
/// let store = SqlitePrefStore::open("prefs.db")?;
/// let mut manager = DeviceManagerBuilder::new(&store, MyDirectoryFactory::new()).build()?;
/// manager.add_observer(Arc::new(CallbackObserver::new(|event| println!("{:?}", event))));
/// manager.start();
///
/// loop {
///     manager.poll();
///     std::thread::sleep(Duration::from_millis(250));
/// }
/// ```
pub struct DeviceManager<'a> {
    clock: Arc<dyn Clock>,
    client_factory: Box<dyn DirectoryClientFactory>,
    prefs: SyncPrefs<'a>,
    scheduler: Box<dyn SyncScheduler>,
    config: DeviceSyncConfig,
    observers: ObserverList,
    /// Mirror of the persisted unlock keys.
    unlock_keys: Vec<DeviceRecord>,
    in_flight: Option<InFlightSync>,
    started: bool,
}

impl<'a> DeviceManager<'a> {
    /// Loads the cached unlock keys and starts the scheduler.
    ///
    /// Starts in aggressive recovery when the last attempt failed or no sync
    /// ever succeeded. Calling this again has no effect.
    pub fn start(&mut self) {
        if self.started {
            warn!("Device manager already started");
            return;
        }
        self.started = true;

        self.update_unlock_keys_from_prefs();

        let last_successful_sync = self.last_sync_time();
        let elapsed_since_last_sync = match last_successful_sync {
            Some(last) => self
                .clock
                .now()
                .duration_since(last)
                .unwrap_or(Duration::ZERO),
            None => Duration::MAX,
        };

        let is_recovering_from_failure =
            self.prefs.is_recovering_from_failure() || last_successful_sync.is_none();
        let strategy = if is_recovering_from_failure {
            Strategy::AggressiveRecovery
        } else {
            Strategy::PeriodicRefresh
        };

        info!(
            "Starting device manager with {} unlock keys ({:?})",
            self.unlock_keys.len(),
            strategy
        );
        self.scheduler.start(elapsed_since_last_sync, strategy);
    }

    /// Returns true once [`DeviceManager::start`] has run.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Adds an observer.
    pub fn add_observer(&mut self, observer: Arc<dyn SyncObserver>) {
        self.observers.add_observer(observer);
    }

    /// Removes an observer. Returns false if it was not registered.
    pub fn remove_observer(&mut self, observer: &Arc<dyn SyncObserver>) -> bool {
        self.observers.remove_observer(observer)
    }

    /// Syncs as soon as possible, reporting `reason` to the directory.
    ///
    /// The reason is persisted and sticks until an attempt succeeds. An
    /// attempt already in flight is not interrupted.
    ///
    /// # Panics
    ///
    /// Panics if called before [`DeviceManager::start`].
    pub fn force_sync_now(&mut self, reason: InvocationReason) {
        self.assert_started("force_sync_now");

        persist("invocation reason", self.prefs.set_invocation_reason(reason));
        if let Some(request) = self.scheduler.force_sync() {
            self.on_sync_requested(request);
        }
    }

    /// Processes a directory answer if one arrived, then fires the scheduler
    /// if the next attempt is due.
    ///
    /// # Panics
    ///
    /// Panics if called before [`DeviceManager::start`].
    pub fn poll(&mut self) {
        self.assert_started("poll");

        if let Some(outcome) = self.take_outcome() {
            self.on_list_devices_complete(outcome);
        }

        if self.in_flight.is_none() {
            if let Some(request) = self.scheduler.poll() {
                self.on_sync_requested(request);
            }
        }
    }

    /// Time of the last successful sync, or None if there never was one.
    pub fn last_sync_time(&self) -> Option<SystemTime> {
        let secs = self.prefs.last_sync_time_seconds();
        if secs <= 0.0 {
            return None;
        }
        let last_sync_time = clock::try_from_secs_f64(secs);
        if last_sync_time.is_none() {
            warn!("Ignoring unreadable last sync time: {}", secs);
        }
        last_sync_time
    }

    /// Time until the scheduler's next attempt.
    pub fn time_to_next_attempt(&self) -> Duration {
        self.scheduler.time_to_next_sync()
    }

    /// Returns true while a sync attempt is running.
    pub fn is_sync_in_progress(&self) -> bool {
        self.scheduler.sync_state() == SchedulerState::SyncInProgress
    }

    /// Returns true if the scheduler is in aggressive recovery.
    ///
    /// This reads the scheduler, not the persisted flag.
    pub fn is_recovering_from_failure(&self) -> bool {
        self.scheduler.strategy() == Strategy::AggressiveRecovery
    }

    /// The cached unlock keys, in persisted order.
    pub fn device_list(&self) -> &[DeviceRecord] {
        &self.unlock_keys
    }

    /// Reason carried by the outstanding request, if any.
    pub fn in_flight_reason(&self) -> Option<InvocationReason> {
        self.in_flight.as_ref().map(|sync| sync.invocation_reason)
    }

    /// The configuration in use.
    pub fn config(&self) -> &DeviceSyncConfig {
        &self.config
    }

    /// Returns a snapshot of the sync state.
    pub fn status(&self) -> DeviceSyncStatus {
        DeviceSyncStatus {
            last_sync_time_seconds: self.last_sync_time().map(clock::to_secs_f64),
            time_to_next_attempt_ms: u64::try_from(self.time_to_next_attempt().as_millis())
                .unwrap_or(u64::MAX),
            is_recovering_from_failure: self.is_recovering_from_failure(),
            is_sync_in_progress: self.is_sync_in_progress(),
            unlock_key_count: self.unlock_keys.len(),
        }
    }

    /// Picks the reason to report for a new attempt.
    ///
    /// A persisted reason wins until a sync succeeds, so a manual request
    /// that keeps failing keeps being reported as manual.
    fn next_invocation_reason(&self) -> InvocationReason {
        match InvocationReason::from_code(self.prefs.invocation_reason_code()) {
            Some(reason) if reason != InvocationReason::Unknown => reason,
            _ if self.last_sync_time().is_none() => InvocationReason::Initialization,
            _ if self.is_recovering_from_failure() => InvocationReason::FailureRecovery,
            _ => InvocationReason::Periodic,
        }
    }

    fn take_outcome(&mut self) -> Option<ListDevicesOutcome> {
        let in_flight = self.in_flight.as_mut()?;
        match in_flight.receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(DirectoryError::Abandoned)),
        }
    }

    fn on_list_devices_complete(&mut self, outcome: ListDevicesOutcome) {
        let Some(in_flight) = self.in_flight.take() else {
            return;
        };
        match outcome {
            Ok(response) => self.on_list_devices_success(in_flight, response),
            Err(e) => self.on_list_devices_failure(in_flight, e),
        }
    }

    fn on_list_devices_success(&mut self, in_flight: InFlightSync, response: ListDevicesResponse) {
        let unlock_keys = unlock_keys_to_pref_values(&response.devices);
        let unlock_keys_differ = unlock_keys != self.prefs.unlock_keys();
        let unlock_keys_changed =
            persist("unlock keys", self.prefs.set_unlock_keys(unlock_keys)) && unlock_keys_differ;
        self.update_unlock_keys_from_prefs();

        // Reset scheduling metadata.
        persist(
            "recovery flag",
            self.prefs.set_recovering_from_failure(false),
        );
        persist(
            "last sync time",
            self.prefs
                .set_last_sync_time_seconds(clock::to_secs_f64(self.clock.now())),
        );
        persist(
            "invocation reason",
            self.prefs.set_invocation_reason(InvocationReason::Unknown),
        );

        let InFlightSync {
            request, client, ..
        } = in_flight;
        request.on_did_complete(true);
        drop(client);

        let change = if unlock_keys_changed {
            DeviceChangeResult::Changed
        } else {
            DeviceChangeResult::Unchanged
        };
        info!(
            "Device sync succeeded: {} unlock keys ({:?})",
            self.unlock_keys.len(),
            change
        );
        self.observers
            .notify_sync_finished(SyncResult::Success, change);
    }

    fn on_list_devices_failure(&mut self, in_flight: InFlightSync, error: DirectoryError) {
        error!("Device list request failed: {}", error);
        persist("recovery flag", self.prefs.set_recovering_from_failure(true));

        let InFlightSync {
            request, client, ..
        } = in_flight;
        request.on_did_complete(false);
        drop(client);

        self.observers
            .notify_sync_finished(SyncResult::Failure, DeviceChangeResult::Unchanged);
    }

    /// Rebuilds the cache from prefs, skipping entries that fail to parse.
    fn update_unlock_keys_from_prefs(&mut self) {
        let entries = self.prefs.unlock_keys();
        self.unlock_keys = entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let record = DeviceRecord::from_pref_value(entry);
                if record.is_none() {
                    error!(
                        "Unable to deserialize unlock key (index={}): {}",
                        index, entry
                    );
                }
                record
            })
            .collect();
    }

    fn assert_started(&self, operation: &str) {
        assert!(
            self.started,
            "DeviceManager::{} called before start()",
            operation
        );
    }
}

impl SyncSchedulerDelegate for DeviceManager<'_> {
    /// Issues one directory request for the attempt.
    ///
    /// # Panics
    ///
    /// Panics if another attempt is still outstanding or the manager was not
    /// started.
    fn on_sync_requested(&mut self, request: SyncRequest) {
        self.assert_started("on_sync_requested");
        assert!(
            self.in_flight.is_none(),
            "sync requested while another sync is outstanding"
        );

        self.observers.notify_sync_started();

        let mut client = self.client_factory.create_instance();
        let invocation_reason = self.next_invocation_reason();
        debug!("Requesting device list ({:?})", invocation_reason);

        let (responder, receiver) = ListDevicesResponder::channel();
        client.list_devices(ListDevicesRequest { invocation_reason }, responder);

        self.in_flight = Some(InFlightSync {
            request,
            client,
            receiver,
            invocation_reason,
        });
    }
}

/// Logs a failed store write; the sync itself carries on.
/// Returns true if the write went through.
fn persist(what: &str, result: Result<(), StoreError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to persist {}: {}", what, e);
            false
        }
    }
}

/// Builder for [`DeviceManager`].
pub struct DeviceManagerBuilder<'a> {
    store: &'a dyn PrefStore,
    client_factory: Box<dyn DirectoryClientFactory>,
    config: DeviceSyncConfig,
    clock: Option<Arc<dyn Clock>>,
    scheduler: Option<Box<dyn SyncScheduler>>,
}

impl<'a> DeviceManagerBuilder<'a> {
    /// Creates a builder with default configuration.
    pub fn new<F>(store: &'a dyn PrefStore, client_factory: F) -> Self
    where
        F: DirectoryClientFactory + 'static,
    {
        DeviceManagerBuilder {
            store,
            client_factory: Box::new(client_factory),
            config: DeviceSyncConfig::default(),
            clock: None,
            scheduler: None,
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: DeviceSyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the clock. Defaults to the system clock.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Sets the scheduler. Defaults to a [`RecurringSyncScheduler`] built
    /// from the configuration.
    pub fn scheduler<S>(mut self, scheduler: S) -> Self
    where
        S: SyncScheduler + 'static,
    {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    /// Builds the device manager. Registers default prefs that are missing.
    pub fn build(self) -> DeviceSyncResult<DeviceManager<'a>> {
        self.config.validate()?;

        let prefs = SyncPrefs::new(self.store);
        prefs.register_defaults()?;

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let scheduler: Box<dyn SyncScheduler> = match self.scheduler {
            Some(scheduler) => scheduler,
            None => Box::new(RecurringSyncScheduler::new(Arc::clone(&clock), &self.config)),
        };

        Ok(DeviceManager {
            clock,
            client_factory: self.client_factory,
            prefs,
            scheduler,
            config: self.config,
            observers: ObserverList::new(),
            unlock_keys: Vec::new(),
            in_flight: None,
            started: false,
        })
    }
}
