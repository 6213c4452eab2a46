// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Remote Directory Client
//!
//! Interface to the remote service that lists the user's registered
//! devices. The transport is up to the implementation; the device manager
//! only issues one request per client instance and waits for exactly one
//! answer on the responder.

mod mock;

pub use mock::{MockDirectoryClientFactory, PendingListDevices};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::device::{DeviceRecord, InvocationReason};

/// Request to list the user's devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDevicesRequest {
    /// Why the request is being made.
    pub invocation_reason: InvocationReason,
}

/// Devices registered to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDevicesResponse {
    #[serde(default)]
    pub devices: Vec<DeviceRecord>,
}

/// Directory error types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The directory answered with an error.
    #[error("directory API error: {0}")]
    Api(String),

    /// The client went away without answering.
    #[error("request abandoned without a response")]
    Abandoned,
}

/// Outcome of a list-devices request.
pub type ListDevicesOutcome = Result<ListDevicesResponse, DirectoryError>;

/// One-shot reply channel for a list-devices request.
///
/// Consuming either method answers the request. Dropping the responder
/// without answering is seen as [`DirectoryError::Abandoned`].
#[derive(Debug)]
pub struct ListDevicesResponder {
    sender: oneshot::Sender<ListDevicesOutcome>,
}

impl ListDevicesResponder {
    /// Creates a responder and the receiving half the caller waits on.
    pub fn channel() -> (Self, oneshot::Receiver<ListDevicesOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (ListDevicesResponder { sender }, receiver)
    }

    /// Answers with a device list.
    pub fn succeed(self, response: ListDevicesResponse) {
        // The receiver is gone only when the manager itself was dropped.
        let _ = self.sender.send(Ok(response));
    }

    /// Answers with an error message.
    pub fn fail(self, message: impl Into<String>) {
        let _ = self.sender.send(Err(DirectoryError::Api(message.into())));
    }
}

/// Client for the remote directory.
pub trait DirectoryClient {
    /// Starts a list-devices request. The answer goes to `responder`,
    /// possibly after this call returns.
    fn list_devices(&mut self, request: ListDevicesRequest, responder: ListDevicesResponder);
}

/// Creates directory clients, one per sync attempt.
pub trait DirectoryClientFactory {
    fn create_instance(&self) -> Box<dyn DirectoryClient>;
}
