// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Capped list of user-facing notifications.
//!
//! Records are kept newest first. Adding beyond the cap evicts the oldest
//! records. The unread count is maintained on every operation rather than
//! recomputed, and always equals the number of records with `read = false`.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tide_core::{NewNotification, NotificationRecord};

/// Default number of records kept.
pub const DEFAULT_CAP: usize = 50;

/// Result of [`NotificationCenter::add`].
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added { evicted: usize },
    /// A record with the same id already exists.
    Duplicate,
}

#[derive(Debug, Clone)]
pub struct NotificationCenter {
    records: VecDeque<NotificationRecord>,
    unread: usize,
    cap: usize,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_CAP)
    }
}

impl NotificationCenter {
    pub fn new(cap: usize) -> Self {
        NotificationCenter {
            records: VecDeque::new(),
            unread: 0,
            cap: cap.max(1),
        }
    }

    /// Rebuild from persisted records (newest first), applying the cap.
    pub fn from_records(records: Vec<NotificationRecord>, cap: usize) -> Self {
        let mut center = Self::new(cap);
        for record in records.into_iter().rev() {
            center.insert(record);
        }
        center
    }

    /// Prepend a notification, evicting the oldest beyond the cap.
    pub fn add(&mut self, notification: NewNotification) -> AddOutcome {
        self.insert(notification.into())
    }

    fn insert(&mut self, record: NotificationRecord) -> AddOutcome {
        if self.records.iter().any(|r| r.id == record.id) {
            return AddOutcome::Duplicate;
        }
        if !record.read {
            self.unread += 1;
        }
        self.records.push_front(record);

        let mut evicted = 0;
        while self.records.len() > self.cap {
            if let Some(old) = self.records.pop_back() {
                if !old.read {
                    self.unread -= 1;
                }
                evicted += 1;
            }
        }
        AddOutcome::Added { evicted }
    }

    /// Mark one record read. Returns false if it was missing or already read.
    pub fn mark_read(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        let changed = record.mark_read(now);
        if changed {
            self.unread -= 1;
        }
        changed
    }

    /// Mark every record read. Returns how many changed.
    pub fn mark_all_read(&mut self, now: DateTime<Utc>) -> usize {
        let mut changed = 0;
        for record in self.records.iter_mut() {
            if record.mark_read(now) {
                changed += 1;
            }
        }
        self.unread = 0;
        changed
    }

    pub fn remove(&mut self, id: &str) -> Option<NotificationRecord> {
        let index = self.records.iter().position(|r| r.id == id)?;
        let record = self.records.remove(index)?;
        if !record.read {
            self.unread -= 1;
        }
        Some(record)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.unread = 0;
    }

    pub fn unread_count(&self) -> usize {
        self.unread
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn get(&self, id: &str) -> Option<&NotificationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Records, newest first.
    pub fn records(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.iter()
    }

    pub fn unread(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.iter().filter(|r| !r.read)
    }

    /// Snapshot for persistence, newest first.
    pub fn to_records(&self) -> Vec<NotificationRecord> {
        self.records.iter().cloned().collect()
    }
}

#[cfg(test)]
#[path = "notifications_tests.rs"]
mod tests;
