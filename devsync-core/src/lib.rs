// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Devsync Core Library
//!
//! Keeps a local, persisted copy of the devices that are allowed to unlock
//! this machine. A remote directory is queried on a recurring schedule, with
//! a steady refresh cadence while things go well and short, jittered,
//! escalating retries after a failure.
//!
//! # Module Structure
//!
//! - [`device`] - Device records and the [`DeviceManager`] orchestrator
//! - [`scheduler`] - Recurring sync scheduling (periodic vs. recovery)
//! - [`directory`] - Remote directory client interface
//! - [`store`] - Durable key/value state
//! - [`events`] - Observer notifications
//! - [`driver`] - Async host loop

pub mod clock;
pub mod config;
pub mod device;
pub mod directory;
pub mod driver;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::DeviceSyncConfig;
pub use device::{
    DeviceManager, DeviceManagerBuilder, DeviceRecord, DeviceSyncStatus, InvocationReason,
};
pub use directory::{
    DirectoryClient, DirectoryClientFactory, DirectoryError, ListDevicesRequest,
    ListDevicesResponder, ListDevicesResponse, MockDirectoryClientFactory,
};
pub use driver::{run_sync_loop, SyncCommand};
pub use error::{DeviceSyncError, DeviceSyncResult};
pub use events::{
    CallbackObserver, DeviceChangeResult, ObserverList, SyncEvent, SyncObserver, SyncResult,
};
pub use scheduler::{
    MockSyncScheduler, RecurringSyncScheduler, SchedulerState, Strategy, SyncRequest,
    SyncScheduler, SyncSchedulerDelegate,
};
pub use store::{MemoryPrefStore, PrefStore, SqlitePrefStore, StoreError, SyncPrefs};
