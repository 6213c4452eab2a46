// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Async host loop for a [`DeviceManager`].
//!
//! The manager itself never sleeps. This loop polls it, then waits either
//! for the next scheduled attempt or, while a request is outstanding, for
//! the configured response poll interval. The loop owns the only mutable
//! borrow of the manager while it runs, so the host reaches it through
//! [`SyncCommand`]s.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::device::{DeviceManager, InvocationReason};
use crate::events::SyncObserver;

/// Requests the host can make while the loop runs.
pub enum SyncCommand {
    /// Sync now, reporting the given reason.
    ForceSync(InvocationReason),
    /// Register an observer.
    AddObserver(Arc<dyn SyncObserver>),
    /// Unregister an observer.
    RemoveObserver(Arc<dyn SyncObserver>),
}

impl fmt::Debug for SyncCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncCommand::ForceSync(reason) => f.debug_tuple("ForceSync").field(reason).finish(),
            SyncCommand::AddObserver(_) => f.write_str("AddObserver"),
            SyncCommand::RemoveObserver(_) => f.write_str("RemoveObserver"),
        }
    }
}

/// Runs the manager until `shutdown` turns true or its sender is dropped.
///
/// Starts the manager first if needed. Commands are applied as they arrive;
/// once every command sender is gone the loop keeps running on its schedule.
pub async fn run_sync_loop(
    manager: &mut DeviceManager<'_>,
    mut commands: mpsc::Receiver<SyncCommand>,
    mut shutdown: watch::Receiver<bool>,
) {
    if !manager.is_started() {
        manager.start();
    }
    info!("Device sync loop running");

    let mut commands_open = true;
    loop {
        if *shutdown.borrow() {
            break;
        }

        manager.poll();

        let delay = next_wake_delay(manager);
        debug!("Device sync loop sleeping for {:?}", delay);

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            command = commands.recv(), if commands_open => match command {
                Some(command) => apply_command(manager, command),
                None => {
                    debug!("Device sync command channel closed");
                    commands_open = false;
                }
            },
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("Device sync loop stopped");
}

fn apply_command(manager: &mut DeviceManager<'_>, command: SyncCommand) {
    debug!("Device sync command: {:?}", command);
    match command {
        SyncCommand::ForceSync(reason) => manager.force_sync_now(reason),
        SyncCommand::AddObserver(observer) => manager.add_observer(observer),
        SyncCommand::RemoveObserver(observer) => {
            manager.remove_observer(&observer);
        }
    }
}

fn next_wake_delay(manager: &DeviceManager<'_>) -> Duration {
    let poll_interval = manager.config().response_poll_interval;
    if manager.is_sync_in_progress() {
        return poll_interval;
    }
    match manager.time_to_next_attempt() {
        Duration::ZERO => poll_interval,
        delay => delay,
    }
}
