// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered, durable buffer of mutations awaiting acknowledgement.
//!
//! The queue lives in memory as a `VecDeque` and is mirrored to the
//! persistent store so that pending work survives restarts. Mutations that
//! exhaust their retry budget move to a separate permanent-failure log,
//! which is persisted too and can be inspected, requeued or discarded.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tide_core::{Mutation, MutationId};

use crate::store::{keys, KeyValueStore, PersistentStore};

/// Error type for queue operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The mutation failed its local shape check.
    #[error("{0}")]
    Malformed(#[from] tide_core::Error),

    /// No mutation with this id.
    #[error("mutation not found: {0}")]
    NotFound(MutationId),
}

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// A mutation that exceeded its retry budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedMutation {
    pub mutation: Mutation,
    pub failed_at: DateTime<Utc>,
    pub reason: String,
}

/// FIFO queue of pending mutations.
pub struct MutationQueue<K: KeyValueStore> {
    items: VecDeque<Mutation>,
    failed: Vec<FailedMutation>,
    store: Arc<PersistentStore<K>>,
}

impl<K: KeyValueStore> MutationQueue<K> {
    /// Loads the queue and failure log from the store.
    ///
    /// Entries that no longer pass the shape check are dropped with a
    /// warning rather than being sent.
    pub fn load(store: Arc<PersistentStore<K>>) -> Self {
        let persisted: Vec<Mutation> = store.load_or_default(keys::QUEUE);
        let failed: Vec<FailedMutation> = store.load_or_default(keys::FAILED);

        let mut items = VecDeque::with_capacity(persisted.len());
        for mutation in persisted {
            match mutation.validate() {
                Ok(()) => items.push_back(mutation),
                Err(e) => tracing::warn!("Dropping persisted mutation: {}", e),
            }
        }

        if !items.is_empty() {
            tracing::info!("Restored {} pending mutations", items.len());
        }

        MutationQueue {
            items,
            failed,
            store,
        }
    }

    /// Appends a mutation to the tail and persists the queue.
    pub fn enqueue(&mut self, mutation: Mutation) -> QueueResult<()> {
        mutation.validate()?;
        self.items.push_back(mutation);
        self.persist_queue();
        Ok(())
    }

    /// Returns a copy of the queue in FIFO order.
    pub fn snapshot(&self) -> Vec<Mutation> {
        self.items.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &MutationId) -> Option<&Mutation> {
        self.items.iter().find(|m| &m.id == id)
    }

    /// Removes an acknowledged mutation. Does not persist.
    pub fn remove(&mut self, id: &MutationId) -> Option<Mutation> {
        let index = self.items.iter().position(|m| &m.id == id)?;
        self.items.remove(index)
    }

    /// Records a rejection in place and returns the new attempt count.
    /// Does not persist.
    pub fn record_rejection(&mut self, id: &MutationId, reason: &str) -> Option<u32> {
        let mutation = self.items.iter_mut().find(|m| &m.id == id)?;
        mutation.record_rejection(reason);
        Some(mutation.attempts)
    }

    /// Moves a mutation to the permanent-failure log. Does not persist.
    pub fn fail_permanently(&mut self, id: &MutationId, reason: &str) -> Option<FailedMutation> {
        let mutation = self.remove(id)?;
        let failed = FailedMutation {
            mutation,
            failed_at: Utc::now(),
            reason: reason.to_string(),
        };
        self.failed.push(failed.clone());
        Some(failed)
    }

    /// Returns the permanent-failure log, oldest first.
    pub fn failed(&self) -> &[FailedMutation] {
        &self.failed
    }

    /// Moves a permanently failed mutation back to the tail of the queue
    /// with a fresh retry budget, and persists both lists.
    pub fn requeue(&mut self, id: &MutationId) -> QueueResult<&Mutation> {
        let index = self
            .failed
            .iter()
            .position(|f| &f.mutation.id == id)
            .ok_or_else(|| QueueError::NotFound(id.clone()))?;
        let mut mutation = self.failed.remove(index).mutation;
        mutation.attempts = 0;
        mutation.last_error = None;
        self.items.push_back(mutation);
        self.persist();
        self.items
            .back()
            .ok_or_else(|| QueueError::NotFound(id.clone()))
    }

    /// Drops a mutation from the permanent-failure log and persists it.
    pub fn discard(&mut self, id: &MutationId) -> QueueResult<FailedMutation> {
        let index = self
            .failed
            .iter()
            .position(|f| &f.mutation.id == id)
            .ok_or_else(|| QueueError::NotFound(id.clone()))?;
        let failed = self.failed.remove(index);
        self.persist_failed();
        Ok(failed)
    }

    /// Persists the queue and the failure log.
    pub fn persist(&self) {
        self.persist_queue();
        self.persist_failed();
    }

    fn persist_queue(&self) {
        self.store.save_logged(keys::QUEUE, &self.items);
    }

    fn persist_failed(&self) {
        self.store.save_logged(keys::FAILED, &self.failed);
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
