// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing notification records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Broad grouping used to filter and style notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Engine status (connectivity, channel state).
    System,
    /// Mutation sync results.
    Sync,
    /// Activity by other users pushed from the server.
    Activity,
    /// Anything requiring attention.
    Alert,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::System => "system",
            Category::Sync => "sync",
            Category::Activity => "activity",
            Category::Alert => "alert",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "system" => Ok(Category::System),
            "sync" => Ok(Category::Sync),
            "activity" => Ok(Category::Activity),
            "alert" => Ok(Category::Alert),
            _ => Err(Error::InvalidCategory(s.to_string())),
        }
    }
}

/// Urgency of a notification, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(Error::InvalidPriority(s.to_string())),
        }
    }
}

/// Input for a new notification.
///
/// `id` and `created_at` are optional so that locally raised notifications
/// can omit them; server-pushed notifications usually carry both, which
/// lets the notification center deduplicate redelivered events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewNotification {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        NewNotification {
            id: None,
            category,
            priority: Priority::Normal,
            message: message.into(),
            created_at: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A notification as held by the notification center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub category: Category,
    pub priority: Priority,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
    pub read_at: Option<DateTime<Utc>>,
}

impl NotificationRecord {
    /// Marks the record read. Returns false if it was already read.
    pub fn mark_read(&mut self, now: DateTime<Utc>) -> bool {
        if self.read {
            return false;
        }
        self.read = true;
        self.read_at = Some(now);
        true
    }
}

impl From<NewNotification> for NotificationRecord {
    fn from(n: NewNotification) -> Self {
        NotificationRecord {
            id: n.id.unwrap_or_else(|| uuid::Uuid::now_v7().to_string()),
            category: n.category,
            priority: n.priority,
            message: n.message,
            created_at: n.created_at.unwrap_or_else(Utc::now),
            read: false,
            read_at: None,
        }
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
