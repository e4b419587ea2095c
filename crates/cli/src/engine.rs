// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync engine service object.
//!
//! [`SyncEngine`] wires the components together: mutations are applied to
//! the [`StateStore`] and appended to the queue in caller order, flushes
//! are triggered by connectivity, a timer or an explicit request, and push
//! events are folded into the [`NotificationCenter`]. It is built once at
//! startup and shared by `Arc`.
//!
//! Lock order is state, then queue. Neither lock is held across an await.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tide_core::{
    Category, Mutation, MutationId, NewNotification, NotificationRecord, Priority, PushEvent,
};
use tokio::sync::{mpsc, Notify};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::connectivity::{ConnectivityMonitor, Transition};
use crate::error::Result;
use crate::notifications::{AddOutcome, NotificationCenter, DEFAULT_CAP};
use crate::state::{EntityKey, Fields, StateStore};
use crate::store::{keys, KeyValueStore, PersistentStore};
use crate::sync::{
    BatchTransport, ChannelEvent, FailedMutation, FlushOutcome, FlushReport, SyncConfig,
    SyncCoordinator, SyncError,
};

/// Engine tuning.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub sync: SyncConfig,
    pub notification_cap: usize,
    pub flush_interval: Duration,
    pub settle: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            sync: SyncConfig::default(),
            notification_cap: DEFAULT_CAP,
            flush_interval: Duration::from_secs(30),
            settle: Duration::from_millis(500),
        }
    }
}

impl From<&crate::config::Config> for EngineConfig {
    fn from(config: &crate::config::Config) -> Self {
        EngineConfig {
            sync: config.sync_config(),
            notification_cap: config.notifications.cap,
            flush_interval: config.flush_interval(),
            settle: config.settle(),
        }
    }
}

/// Point-in-time summary for display.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStatus {
    pub online: bool,
    pub authenticated: bool,
    pub pending: usize,
    pub failed: usize,
    pub flush_in_progress: bool,
    pub last_successful_sync: Option<DateTime<Utc>>,
    pub notifications: usize,
    pub unread: usize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SyncEngine<K: KeyValueStore> {
    store: Arc<PersistentStore<K>>,
    coordinator: SyncCoordinator<K>,
    state: Mutex<StateStore>,
    notifications: Mutex<NotificationCenter>,
    preferences: Mutex<BTreeMap<String, String>>,
    connectivity: ConnectivityMonitor,
    flush_requested: Notify,
    authenticated: AtomicBool,
    config: EngineConfig,
}

impl<K: KeyValueStore + 'static> SyncEngine<K> {
    /// Build the engine, loading persisted state before anything else.
    ///
    /// Pending mutations are re-applied so the state store reflects every
    /// change not yet acknowledged.
    pub fn open(
        store: Arc<PersistentStore<K>>,
        transport: Box<dyn BatchTransport>,
        config: EngineConfig,
        initially_online: bool,
    ) -> Self {
        let coordinator =
            SyncCoordinator::new(Arc::clone(&store), transport, config.sync.clone());

        let mut state = StateStore::new();
        state.hydrate(std::iter::empty(), &coordinator.pending());

        let records: Vec<NotificationRecord> = store.load_or_default(keys::NOTIFICATIONS);
        let notifications = NotificationCenter::from_records(records, config.notification_cap);
        let preferences: BTreeMap<String, String> = store.load_or_default(keys::PREFERENCES);

        SyncEngine {
            store,
            coordinator,
            state: Mutex::new(state),
            notifications: Mutex::new(notifications),
            preferences: Mutex::new(preferences),
            connectivity: ConnectivityMonitor::new(initially_online),
            flush_requested: Notify::new(),
            authenticated: AtomicBool::new(true),
            config,
        }
    }

    /// Apply a mutation locally and queue it for the remote.
    ///
    /// Malformed mutations are logged and returned as errors; they never
    /// reach the state store or the queue.
    pub fn mutate(&self, mutation: Mutation) -> Result<MutationId> {
        if let Err(e) = mutation.validate() {
            tracing::error!("Rejected malformed mutation: {}", e);
            return Err(e.into());
        }

        let id = mutation.id.clone();
        let mut state = lock(&self.state);
        state.apply(&mutation);
        if let Err(e) = self.coordinator.enqueue(mutation) {
            state.rollback(&id);
            return Err(e.into());
        }
        tracing::debug!("Queued mutation {}", id);
        Ok(id)
    }

    /// Flush the queue now and fold the outcome into local state.
    pub async fn flush(&self) -> std::result::Result<FlushOutcome, SyncError> {
        match self.coordinator.flush().await {
            Ok(outcome) => {
                if let FlushOutcome::Completed(report) = &outcome {
                    self.connectivity.set_online(true);
                    self.settle_report(report);
                }
                Ok(outcome)
            }
            Err(e) => {
                if matches!(e, SyncError::Transport(_)) {
                    self.connectivity.set_online(false);
                }
                Err(e)
            }
        }
    }

    fn settle_report(&self, report: &FlushReport) {
        {
            let mut state = lock(&self.state);
            for id in &report.applied {
                state.acknowledge(id);
            }
            for failed in &report.permanently_failed {
                let (collection, entity_id) = failed.mutation.target();
                if self.coordinator.has_pending_for(collection, entity_id) {
                    state.acknowledge(&failed.mutation.id);
                } else {
                    state.rollback(&failed.mutation.id);
                }
            }
        }

        if report.permanently_failed.is_empty() {
            return;
        }

        // A requeued mutation can fail again; its alert is replaced, not deduplicated
        let mut center = lock(&self.notifications);
        for failed in &report.permanently_failed {
            let (collection, entity_id) = failed.mutation.target();
            let id = format!("sync-failed-{}", failed.mutation.id);
            let message = format!(
                "{} of {}/{} was rejected: {}",
                failed.mutation.kind, collection, entity_id, failed.reason
            );
            center.remove(&id);
            center.add(
                NewNotification::new(Category::Sync, message)
                    .with_id(id)
                    .with_priority(Priority::High),
            );
        }
        self.persist_notifications(&center);
    }

    /// Ask the run loop to flush.
    pub fn request_flush(&self) {
        self.flush_requested.notify_one();
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::Release);
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::Acquire)
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    pub fn pending(&self) -> Vec<Mutation> {
        self.coordinator.pending()
    }

    pub fn failed(&self) -> Vec<FailedMutation> {
        self.coordinator.failed()
    }

    /// Give a failed mutation a fresh retry budget and re-apply it locally.
    pub fn requeue(&self, id: &MutationId) -> Result<Mutation> {
        let mut state = lock(&self.state);
        let mutation = self.coordinator.requeue(id)?;
        state.apply(&mutation);
        Ok(mutation)
    }

    pub fn discard(&self, id: &MutationId) -> Result<FailedMutation> {
        Ok(self.coordinator.discard(id)?)
    }

    pub fn entity(&self, collection: &str, id: &str) -> Option<Fields> {
        lock(&self.state).get(collection, id).cloned()
    }

    pub fn entities(&self, collection: &str) -> Vec<(String, Fields)> {
        lock(&self.state)
            .collection(collection)
            .map(|(id, fields)| (id.to_string(), fields.clone()))
            .collect()
    }

    /// Replace local entities with a remote snapshot, keeping pending
    /// changes on top.
    pub fn hydrate(&self, entities: impl IntoIterator<Item = (EntityKey, Fields)>) {
        let mut state = lock(&self.state);
        let pending = self.coordinator.pending();
        state.hydrate(entities, &pending);
    }

    /// Surface a notification. The only way user-facing alerts are raised.
    pub fn notify(&self, notification: NewNotification) -> AddOutcome {
        let mut center = lock(&self.notifications);
        let outcome = center.add(notification);
        if matches!(outcome, AddOutcome::Added { .. }) {
            self.persist_notifications(&center);
        }
        outcome
    }

    pub fn mark_read(&self, id: &str) -> bool {
        let mut center = lock(&self.notifications);
        let changed = center.mark_read(id, Utc::now());
        if changed {
            self.persist_notifications(&center);
        }
        changed
    }

    pub fn mark_all_read(&self) -> usize {
        let mut center = lock(&self.notifications);
        let changed = center.mark_all_read(Utc::now());
        if changed > 0 {
            self.persist_notifications(&center);
        }
        changed
    }

    pub fn remove_notification(&self, id: &str) -> Option<NotificationRecord> {
        let mut center = lock(&self.notifications);
        let removed = center.remove(id);
        if removed.is_some() {
            self.persist_notifications(&center);
        }
        removed
    }

    pub fn clear_notifications(&self) {
        let mut center = lock(&self.notifications);
        center.clear();
        self.persist_notifications(&center);
    }

    /// Notifications, newest first.
    pub fn notifications(&self) -> Vec<NotificationRecord> {
        lock(&self.notifications).to_records()
    }

    pub fn unread_count(&self) -> usize {
        lock(&self.notifications).unread_count()
    }

    fn persist_notifications(&self, center: &NotificationCenter) {
        self.store
            .save_logged(keys::NOTIFICATIONS, &center.to_records());
    }

    pub fn preference(&self, key: &str) -> Option<String> {
        lock(&self.preferences).get(key).cloned()
    }

    pub fn preferences(&self) -> BTreeMap<String, String> {
        lock(&self.preferences).clone()
    }

    pub fn set_preference(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut preferences = lock(&self.preferences);
        preferences.insert(key.into(), value.into());
        self.store.save_logged(keys::PREFERENCES, &*preferences);
    }

    pub fn status(&self) -> EngineStatus {
        let sync = self.coordinator.state();
        let center = lock(&self.notifications);
        EngineStatus {
            online: self.connectivity.is_online(),
            authenticated: self.is_authenticated(),
            pending: sync.queue.len(),
            failed: self.coordinator.failed().len(),
            flush_in_progress: sync.flush_in_progress,
            last_successful_sync: sync.last_successful_sync,
            notifications: center.len(),
            unread: center.unread_count(),
        }
    }

    /// Fold a push event into local state.
    pub fn handle_push(&self, event: PushEvent) {
        match event {
            PushEvent::Notification(notification) => {
                if self.notify(notification) == AddOutcome::Duplicate {
                    tracing::debug!("Ignoring duplicate notification");
                }
            }
            PushEvent::NotificationRead { id } => {
                self.mark_read(&id);
            }
            PushEvent::SyncRequested => self.request_flush(),
        }
    }

    /// React to a push channel event.
    pub fn handle_channel_event(&self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected => {
                self.connectivity.set_online(true);
            }
            ChannelEvent::Disconnected => {
                self.connectivity.set_online(false);
            }
            ChannelEvent::Push(event) => self.handle_push(event),
            ChannelEvent::GaveUp { attempts } => {
                self.connectivity.set_online(false);
                self.notify(
                    NewNotification::new(
                        Category::System,
                        format!(
                            "Realtime updates stopped after {} failed connection attempts",
                            attempts
                        ),
                    )
                    .with_priority(Priority::High),
                );
            }
        }
    }

    async fn flush_logged(&self) {
        if let Err(e) = self.flush().await {
            tracing::debug!("Flush ended without reaching the remote: {}", e);
        }
    }

    /// Drive flush triggers and channel events until cancelled.
    ///
    /// Flushes on a settled online transition, on each timer tick while
    /// online and authenticated, and on [`SyncEngine::request_flush`].
    ///
    /// Only the timer is gated on authentication. The online transition and
    /// explicit requests flush regardless; an unauthenticated remote answers
    /// with a transport error and the queue stays as it was.
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::Receiver<ChannelEvent>,
        cancel: CancellationToken,
    ) {
        let mut connectivity = self.connectivity.subscribe(self.config.settle);
        let period = self.config.flush_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut events_open = true;

        tracing::info!(
            "Sync engine running ({} pending, flush every {}s)",
            self.coordinator.pending_count(),
            period.as_secs()
        );

        if self.connectivity.is_online() && self.coordinator.pending_count() > 0 {
            self.flush_logged().await;
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                transition = connectivity.next() => match transition {
                    Some(Transition::Online) => self.flush_logged().await,
                    Some(Transition::Offline) => {}
                    None => break,
                },
                _ = ticker.tick() => {
                    if self.connectivity.is_online() && self.is_authenticated() {
                        self.flush_logged().await;
                    }
                }
                _ = self.flush_requested.notified() => self.flush_logged().await,
                event = events.recv(), if events_open => match event {
                    Some(event) => self.handle_channel_event(event),
                    None => events_open = false,
                },
            }
        }

        tracing::info!("Sync engine stopped");
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
