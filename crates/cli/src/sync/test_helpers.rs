// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;
use tide_core::{
    BatchRequest, BatchResponse, ItemResult, Mutation, MutationKind, MutationPayload,
};

use super::transport::{
    BatchTransport, PushTransport, TransportError, TransportFuture, TransportResult,
};
use crate::store::{MemoryStore, PersistentStore};

/// Create an update mutation for the given task.
pub fn make_test_mutation(entity_id: &str) -> Mutation {
    Mutation::new(
        MutationKind::Update,
        MutationPayload::new("tasks", entity_id).with_field("title", json!(entity_id)),
    )
}

/// Create an empty in-memory persistent store.
pub fn memory_store() -> Arc<PersistentStore<MemoryStore>> {
    Arc::new(PersistentStore::new(MemoryStore::new()))
}

/// How the mock batch endpoint answers.
#[derive(Debug, Clone)]
pub enum BatchMode {
    /// Apply everything.
    ApplyAll,
    /// Reject mutations targeting these entity ids, apply the rest.
    Reject(HashSet<String>),
    /// Leave mutations targeting these entity ids out of the response.
    Omit(HashSet<String>),
    /// Fail the whole request.
    Fail,
}

struct MockBatchState {
    mode: BatchMode,
    delay: Duration,
    requests: Vec<BatchRequest>,
}

/// Mock batch endpoint recording every request it receives.
///
/// Clones share state, so a test can keep a handle after moving the
/// transport into a coordinator.
#[derive(Clone)]
pub struct MockBatchTransport {
    state: Arc<Mutex<MockBatchState>>,
}

impl MockBatchTransport {
    pub fn new() -> Self {
        MockBatchTransport {
            state: Arc::new(Mutex::new(MockBatchState {
                mode: BatchMode::ApplyAll,
                delay: Duration::ZERO,
                requests: Vec::new(),
            })),
        }
    }

    pub fn set_mode(&self, mode: BatchMode) {
        self.state.lock().unwrap().mode = mode;
    }

    /// Reject mutations targeting these entities.
    pub fn reject(&self, entities: &[&str]) {
        self.set_mode(BatchMode::Reject(
            entities.iter().map(|e| e.to_string()).collect(),
        ));
    }

    /// Delay each response, holding the flush open.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = delay;
    }

    pub fn requests(&self) -> Vec<BatchRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    /// Entity ids of each request, in order.
    pub fn sent_entities(&self) -> Vec<Vec<String>> {
        self.requests()
            .iter()
            .map(|r| {
                r.mutations
                    .iter()
                    .map(|m| m.payload.entity_id.clone())
                    .collect()
            })
            .collect()
    }
}

impl BatchTransport for MockBatchTransport {
    fn send_batch(&self, request: BatchRequest) -> TransportFuture<'_, BatchResponse> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            let (mode, delay) = {
                let mut state = state.lock().unwrap();
                state.requests.push(request.clone());
                (state.mode.clone(), state.delay)
            };
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            if matches!(mode, BatchMode::Fail) {
                return Err(TransportError::SendFailed("mock failure".into()));
            }

            let mut results = Vec::new();
            for item in &request.mutations {
                let entity = &item.payload.entity_id;
                match &mode {
                    BatchMode::Reject(set) if set.contains(entity) => {
                        results.push(ItemResult::rejected(item.id.clone(), "mock rejection"))
                    }
                    BatchMode::Omit(set) if set.contains(entity) => {}
                    _ => results.push(ItemResult::applied(item.id.clone())),
                }
            }
            Ok(BatchResponse::new(results))
        })
    }
}

/// Scripted inbound frame for [`MockPushTransport`].
#[derive(Debug, Clone)]
pub enum MockFrame {
    Text(String),
    Close,
}

struct MockPushState {
    /// Number of upcoming connect attempts that fail.
    fail_connects: usize,
    connects: usize,
    connected: bool,
    frames: VecDeque<MockFrame>,
}

/// Mock push transport.
///
/// Once scripted frames run out, `recv` waits forever, like an idle socket.
#[derive(Clone)]
pub struct MockPushTransport {
    state: Arc<Mutex<MockPushState>>,
}

impl MockPushTransport {
    pub fn new() -> Self {
        MockPushTransport {
            state: Arc::new(Mutex::new(MockPushState {
                fail_connects: 0,
                connects: 0,
                connected: false,
                frames: VecDeque::new(),
            })),
        }
    }

    /// Fail the next `n` connect attempts.
    pub fn fail_connects(&self, n: usize) {
        self.state.lock().unwrap().fail_connects = n;
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .frames
            .push_back(MockFrame::Text(text.into()));
    }

    pub fn push_close(&self) {
        self.state.lock().unwrap().frames.push_back(MockFrame::Close);
    }

    /// Total connect attempts, successful or not.
    pub fn connect_count(&self) -> usize {
        self.state.lock().unwrap().connects
    }
}

impl PushTransport for MockPushTransport {
    fn connect(&mut self, _url: &str) -> TransportFuture<'_, ()> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            let mut state = state.lock().unwrap();
            state.connects += 1;
            if state.fail_connects > 0 {
                state.fail_connects -= 1;
                return Err(TransportError::ConnectionFailed("mock failure".into()));
            }
            state.connected = true;
            Ok(())
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            state.lock().unwrap().connected = false;
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<String>> {
        let state = Arc::clone(&self.state);
        Box::pin(async move {
            let frame = state.lock().unwrap().frames.pop_front();
            match frame {
                Some(MockFrame::Text(text)) => Ok(Some(text)),
                Some(MockFrame::Close) => {
                    state.lock().unwrap().connected = false;
                    Ok(None)
                }
                None => std::future::pending::<TransportResult<Option<String>>>().await,
            }
        })
    }

    fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }
}
