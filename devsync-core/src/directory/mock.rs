// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock Directory
//!
//! Captures requests so tests decide when and how each one is answered.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    DirectoryClient, DirectoryClientFactory, ListDevicesRequest, ListDevicesResponder,
    ListDevicesResponse,
};

/// A captured request waiting for the test to answer it.
#[derive(Debug)]
pub struct PendingListDevices {
    pub request: ListDevicesRequest,
    pub responder: ListDevicesResponder,
}

/// How created clients treat incoming requests.
#[derive(Debug, Clone)]
enum AutoReply {
    None,
    Succeed(ListDevicesResponse),
    Fail(String),
}

#[derive(Debug)]
struct MockDirectoryState {
    clients_created: usize,
    requests: Vec<ListDevicesRequest>,
    pending: VecDeque<PendingListDevices>,
    auto_reply: AutoReply,
}

/// Factory for mock directory clients.
///
/// Clones share state. By default every request is parked until the test
/// takes it with [`MockDirectoryClientFactory::take_pending`]; the
/// `auto_*` methods make clients answer synchronously instead.
#[derive(Clone)]
pub struct MockDirectoryClientFactory {
    state: Arc<Mutex<MockDirectoryState>>,
}

impl MockDirectoryClientFactory {
    pub fn new() -> Self {
        MockDirectoryClientFactory {
            state: Arc::new(Mutex::new(MockDirectoryState {
                clients_created: 0,
                requests: Vec::new(),
                pending: VecDeque::new(),
                auto_reply: AutoReply::None,
            })),
        }
    }

    /// Makes clients answer every request with `response`.
    pub fn auto_succeed(&self, response: ListDevicesResponse) {
        self.state.lock().auto_reply = AutoReply::Succeed(response);
    }

    /// Makes clients answer every request with `message` as an error.
    pub fn auto_fail(&self, message: impl Into<String>) {
        self.state.lock().auto_reply = AutoReply::Fail(message.into());
    }

    /// Goes back to parking requests.
    pub fn park_requests(&self) {
        self.state.lock().auto_reply = AutoReply::None;
    }

    /// Number of clients created so far.
    pub fn clients_created(&self) -> usize {
        self.state.lock().clients_created
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<ListDevicesRequest> {
        self.state.lock().requests.clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<ListDevicesRequest> {
        self.state.lock().requests.last().cloned()
    }

    /// Takes the oldest parked request.
    pub fn take_pending(&self) -> Option<PendingListDevices> {
        self.state.lock().pending.pop_front()
    }

    /// Number of parked requests.
    pub fn pending_count(&self) -> usize {
        self.state.lock().pending.len()
    }
}

impl Default for MockDirectoryClientFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryClientFactory for MockDirectoryClientFactory {
    fn create_instance(&self) -> Box<dyn DirectoryClient> {
        self.state.lock().clients_created += 1;
        Box::new(MockDirectoryClient {
            state: Arc::clone(&self.state),
        })
    }
}

struct MockDirectoryClient {
    state: Arc<Mutex<MockDirectoryState>>,
}

impl DirectoryClient for MockDirectoryClient {
    fn list_devices(&mut self, request: ListDevicesRequest, responder: ListDevicesResponder) {
        let mut state = self.state.lock();
        state.requests.push(request.clone());
        match state.auto_reply.clone() {
            AutoReply::None => state.pending.push_back(PendingListDevices { request, responder }),
            AutoReply::Succeed(response) => responder.succeed(response),
            AutoReply::Fail(message) => responder.fail(message),
        }
    }
}
