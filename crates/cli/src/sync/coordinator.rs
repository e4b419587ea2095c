// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Flushes the mutation queue against the batch endpoint.
//!
//! A flush sends the whole queue snapshot as one batch and reconciles the
//! per-item results:
//!
//! - `applied` removes the mutation.
//! - `rejected` leaves it queued with one more attempt recorded, and moves
//!   it to the failure log once its attempts exceed `max_attempts`.
//! - no result leaves it untouched.
//!
//! A transport failure leaves the queue exactly as it was. At most one
//! flush runs at a time; a second caller returns [`FlushOutcome::Skipped`]
//! immediately. The queue lock is never held across the network call, so
//! enqueueing during a flush does not wait on it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tide_core::{BatchRequest, ItemResult, Mutation, MutationId};

use super::queue::{FailedMutation, MutationQueue, QueueError};
use super::transport::{BatchTransport, TransportError};
use crate::store::{KeyValueStore, PersistentStore};

/// Default number of rejections tolerated before a mutation is failed
/// permanently.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Error type for coordinator operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("queue error: {0}")]
    Queue(#[from] QueueError),
}

/// Result type for coordinator operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Configuration for the coordinator.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Rejections tolerated before a mutation is failed permanently. The
    /// next rejection after this many moves it to the failure log; zero
    /// fails it on the first.
    pub max_attempts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// What a call to [`SyncCoordinator::flush`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum FlushOutcome {
    /// Another flush was already in flight.
    Skipped,
    /// Nothing was queued; no request was made.
    Empty,
    /// The batch was sent and its results reconciled.
    Completed(FlushReport),
}

/// Reconciliation summary for one completed flush.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlushReport {
    pub applied: Vec<MutationId>,
    /// Rejected but still queued for retry.
    pub rejected: Vec<MutationId>,
    /// Moved to the failure log during this flush.
    pub permanently_failed: Vec<FailedMutation>,
    /// Sent but absent from the response.
    pub unacknowledged: usize,
}

/// Read-only view of the coordinator's state.
#[derive(Debug, Clone)]
pub struct SyncState {
    pub queue: Vec<Mutation>,
    pub flush_in_progress: bool,
    pub last_successful_sync: Option<DateTime<Utc>>,
}

/// Clears the in-flight flag however the flush exits.
struct FlushGuard<'a>(&'a AtomicBool);

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the mutation queue and drives flushes.
pub struct SyncCoordinator<K: KeyValueStore> {
    queue: Mutex<MutationQueue<K>>,
    transport: Box<dyn BatchTransport>,
    config: SyncConfig,
    in_flight: AtomicBool,
    last_successful_sync: Mutex<Option<DateTime<Utc>>>,
}

impl<K: KeyValueStore> SyncCoordinator<K> {
    /// Create a coordinator, loading the persisted queue.
    pub fn new(
        store: Arc<PersistentStore<K>>,
        transport: Box<dyn BatchTransport>,
        config: SyncConfig,
    ) -> Self {
        SyncCoordinator {
            queue: Mutex::new(MutationQueue::load(store)),
            transport,
            config,
            in_flight: AtomicBool::new(false),
            last_successful_sync: Mutex::new(None),
        }
    }

    fn queue(&self) -> MutexGuard<'_, MutationQueue<K>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a mutation to the queue.
    pub fn enqueue(&self, mutation: Mutation) -> SyncResult<()> {
        self.queue().enqueue(mutation)?;
        Ok(())
    }

    /// Pending mutations in FIFO order.
    pub fn pending(&self) -> Vec<Mutation> {
        self.queue().snapshot()
    }

    pub fn pending_count(&self) -> usize {
        self.queue().len()
    }

    /// Whether any queued mutation targets this entity.
    pub fn has_pending_for(&self, collection: &str, entity_id: &str) -> bool {
        self.queue()
            .iter()
            .any(|m| m.target() == (collection, entity_id))
    }

    /// Permanently failed mutations, oldest first.
    pub fn failed(&self) -> Vec<FailedMutation> {
        self.queue().failed().to_vec()
    }

    /// Move a failed mutation back to the tail of the queue.
    pub fn requeue(&self, id: &MutationId) -> SyncResult<Mutation> {
        let mut queue = self.queue();
        let mutation = queue.requeue(id)?.clone();
        tracing::info!("Requeued mutation {}", id);
        Ok(mutation)
    }

    /// Drop a mutation from the failure log.
    pub fn discard(&self, id: &MutationId) -> SyncResult<FailedMutation> {
        let failed = self.queue().discard(id)?;
        tracing::info!("Discarded failed mutation {}", id);
        Ok(failed)
    }

    pub fn is_flushing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn last_successful_sync(&self) -> Option<DateTime<Utc>> {
        *self
            .last_successful_sync
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SyncState {
        SyncState {
            queue: self.pending(),
            flush_in_progress: self.is_flushing(),
            last_successful_sync: self.last_successful_sync(),
        }
    }

    /// Send the queue snapshot and reconcile the results.
    ///
    /// Returns `Err(SyncError::Transport)` when no usable response arrived;
    /// the queue is left untouched in that case.
    pub async fn flush(&self) -> SyncResult<FlushOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Flush already in progress, skipping");
            return Ok(FlushOutcome::Skipped);
        }
        let _guard = FlushGuard(&self.in_flight);

        let snapshot = self.pending();
        if snapshot.is_empty() {
            return Ok(FlushOutcome::Empty);
        }

        let request = BatchRequest::from_mutations(&snapshot);
        tracing::info!("Flushing {} queued mutations", request.len());

        let response = match self.transport.send_batch(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Flush failed, queue kept for retry: {}", e);
                return Err(e.into());
            }
        };

        let report = self.reconcile(&snapshot, response.results);
        *self
            .last_successful_sync
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());

        tracing::info!(
            "Flush complete: {} applied, {} rejected, {} failed permanently",
            report.applied.len(),
            report.rejected.len(),
            report.permanently_failed.len()
        );
        Ok(FlushOutcome::Completed(report))
    }

    fn reconcile(&self, sent: &[Mutation], results: Vec<ItemResult>) -> FlushReport {
        let mut report = FlushReport::default();
        let mut answered = HashSet::new();
        let mut queue = self.queue();

        for result in results {
            answered.insert(result.id().clone());
            match result {
                ItemResult::Applied { id } => {
                    if queue.remove(&id).is_some() {
                        report.applied.push(id);
                    } else {
                        tracing::debug!("Ignoring result for unknown mutation {}", id);
                    }
                }
                ItemResult::Rejected { id, reason } => {
                    let Some(attempts) = queue.record_rejection(&id, &reason) else {
                        tracing::debug!("Ignoring result for unknown mutation {}", id);
                        continue;
                    };
                    if attempts <= self.config.max_attempts {
                        tracing::warn!(
                            "Mutation {} rejected (attempt {}/{}): {}",
                            id,
                            attempts,
                            self.config.max_attempts,
                            reason
                        );
                        report.rejected.push(id);
                    } else if let Some(failed) = queue.fail_permanently(&id, &reason) {
                        tracing::error!(
                            "Mutation {} failed permanently after {} attempts: {}",
                            id,
                            attempts,
                            reason
                        );
                        report.permanently_failed.push(failed);
                    }
                }
            }
        }

        report.unacknowledged = sent.iter().filter(|m| !answered.contains(&m.id)).count();
        if report.unacknowledged > 0 {
            tracing::warn!(
                "{} mutations got no result and stay queued",
                report.unacknowledged
            );
        }

        queue.persist();
        report
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
