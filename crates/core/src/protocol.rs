// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire messages exchanged with the remote authority.
//!
//! Two channels are involved:
//! - The batch endpoint receives a [`BatchRequest`] and answers with a
//!   [`BatchResponse`] holding one [`ItemResult`] per submitted mutation.
//! - The push channel delivers `{type, payload}` frames decoded into
//!   [`PushEvent`]. Unknown types decode to `None` so newer servers can add
//!   events without breaking older clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mutation::{Mutation, MutationId, MutationKind, MutationPayload};
use crate::notification::NewNotification;

/// One mutation as submitted to the batch endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub id: MutationId,
    pub kind: MutationKind,
    pub payload: MutationPayload,
}

impl From<&Mutation> for BatchItem {
    fn from(m: &Mutation) -> Self {
        BatchItem {
            id: m.id.clone(),
            kind: m.kind,
            payload: m.payload.clone(),
        }
    }
}

/// Ordered list of mutations submitted as a single request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub mutations: Vec<BatchItem>,
}

impl BatchRequest {
    /// Builds a request from a queue snapshot, preserving order.
    pub fn from_mutations<'a>(mutations: impl IntoIterator<Item = &'a Mutation>) -> Self {
        BatchRequest {
            mutations: mutations.into_iter().map(BatchItem::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Serializes the request to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Per-mutation acknowledgement from the remote authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemResult {
    /// The mutation was applied remotely.
    Applied { id: MutationId },
    /// The mutation failed remote validation.
    Rejected {
        id: MutationId,
        #[serde(default)]
        reason: String,
    },
}

impl ItemResult {
    pub fn applied(id: impl Into<MutationId>) -> Self {
        ItemResult::Applied { id: id.into() }
    }

    pub fn rejected(id: impl Into<MutationId>, reason: impl Into<String>) -> Self {
        ItemResult::Rejected {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Returns the id this result acknowledges.
    pub fn id(&self) -> &MutationId {
        match self {
            ItemResult::Applied { id } | ItemResult::Rejected { id, .. } => id,
        }
    }
}

/// Response body of the batch endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<ItemResult>,
}

impl BatchResponse {
    pub fn new(results: Vec<ItemResult>) -> Self {
        BatchResponse { results }
    }

    /// Deserializes a response from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// Server-initiated event delivered over the push channel.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// A user-facing notification to surface.
    Notification(NewNotification),
    /// A notification was read elsewhere.
    NotificationRead { id: String },
    /// The server holds changes relevant to this client; flush and catch up.
    SyncRequested,
}

/// Envelope shared by every push frame.
#[derive(Debug, Serialize, Deserialize)]
struct RawPushEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Deserialize)]
struct ReadPayload {
    id: String,
}

impl PushEvent {
    const NOTIFICATION: &'static str = "notification";
    const NOTIFICATION_READ: &'static str = "notification_read";
    const SYNC_REQUESTED: &'static str = "sync_requested";

    /// Returns the wire `type` tag for this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            PushEvent::Notification(_) => Self::NOTIFICATION,
            PushEvent::NotificationRead { .. } => Self::NOTIFICATION_READ,
            PushEvent::SyncRequested => Self::SYNC_REQUESTED,
        }
    }

    /// Decodes a push frame.
    ///
    /// Returns `Ok(None)` for event types this client does not know.
    pub fn from_json(s: &str) -> Result<Option<Self>, serde_json::Error> {
        let raw: RawPushEvent = serde_json::from_str(s)?;
        let event = match raw.event_type.as_str() {
            Self::NOTIFICATION => Some(PushEvent::Notification(serde_json::from_value(
                raw.payload,
            )?)),
            Self::NOTIFICATION_READ => {
                let read: ReadPayload = serde_json::from_value(raw.payload)?;
                Some(PushEvent::NotificationRead { id: read.id })
            }
            Self::SYNC_REQUESTED => Some(PushEvent::SyncRequested),
            _ => None,
        };
        Ok(event)
    }

    /// Encodes the event as a push frame.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let payload = match self {
            PushEvent::Notification(n) => serde_json::to_value(n)?,
            PushEvent::NotificationRead { id } => serde_json::json!({ "id": id }),
            PushEvent::SyncRequested => Value::Null,
        };
        serde_json::to_string(&RawPushEvent {
            event_type: self.event_type().to_string(),
            payload,
        })
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
