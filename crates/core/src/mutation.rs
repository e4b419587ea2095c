// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pending local state changes.
//!
//! A [`Mutation`] is created when a caller changes local state and lives in
//! the mutation queue until the remote authority acknowledges it. Every
//! mutation targets a single entity, addressed by collection and entity id,
//! so that it can be applied optimistically and rolled back if the remote
//! authority permanently refuses it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Unique, opaque identifier for a mutation.
///
/// Generated locally as a time-ordered UUID, but treated as an opaque
/// string so ids echoed by the remote authority round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MutationId(String);

impl MutationId {
    /// Generates a fresh identifier.
    pub fn generate() -> Self {
        MutationId(uuid::Uuid::now_v7().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MutationId {
    fn from(s: &str) -> Self {
        MutationId(s.to_string())
    }
}

impl From<String> for MutationId {
    fn from(s: String) -> Self {
        MutationId(s)
    }
}

/// The operation a mutation performs on its target entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// Create the entity with the given fields.
    Create,
    /// Merge the given fields into the existing entity.
    Update,
    /// Remove the entity.
    Delete,
}

impl MutationKind {
    /// Returns the string representation used on the wire and in display.
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MutationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "create" => Ok(MutationKind::Create),
            "update" => Ok(MutationKind::Update),
            "delete" => Ok(MutationKind::Delete),
            _ => Err(Error::InvalidKind(s.to_string())),
        }
    }
}

/// Domain data carried by a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationPayload {
    /// Entity collection (e.g. "tasks").
    pub collection: String,
    /// Entity identifier within the collection.
    pub entity_id: String,
    /// Field values for create/update. Empty for delete.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
}

impl MutationPayload {
    /// Creates a payload targeting the given entity.
    pub fn new(collection: impl Into<String>, entity_id: impl Into<String>) -> Self {
        MutationPayload {
            collection: collection.into(),
            entity_id: entity_id.into(),
            fields: Map::new(),
        }
    }

    /// Adds a field value.
    pub fn with_field(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }
}

/// A single pending local state change awaiting remote confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutation {
    pub id: MutationId,
    pub kind: MutationKind,
    pub payload: MutationPayload,
    pub enqueued_at: DateTime<Utc>,
    /// Number of times the remote authority rejected this mutation.
    #[serde(default)]
    pub attempts: u32,
    /// Reason given with the most recent rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Mutation {
    /// Creates a new mutation with a fresh id and zero attempts.
    pub fn new(kind: MutationKind, payload: MutationPayload) -> Self {
        Mutation {
            id: MutationId::generate(),
            kind,
            payload,
            enqueued_at: Utc::now(),
            attempts: 0,
            last_error: None,
        }
    }

    /// Returns the `(collection, entity_id)` pair this mutation targets.
    pub fn target(&self) -> (&str, &str) {
        (&self.payload.collection, &self.payload.entity_id)
    }

    /// Checks the structural shape of the mutation.
    ///
    /// A mutation that fails this check is a programmer error and must never
    /// be queued.
    pub fn validate(&self) -> Result<()> {
        let malformed = |reason: &str| Error::MalformedMutation {
            id: self.id.to_string(),
            reason: reason.to_string(),
        };

        if self.id.as_str().trim().is_empty() {
            return Err(malformed("id is empty"));
        }
        if self.payload.collection.trim().is_empty() {
            return Err(malformed("collection is empty"));
        }
        if self.payload.entity_id.trim().is_empty() {
            return Err(malformed("entity id is empty"));
        }
        match self.kind {
            MutationKind::Create | MutationKind::Update if self.payload.fields.is_empty() => {
                Err(malformed(&format!("{} requires at least one field", self.kind)))
            }
            MutationKind::Delete if !self.payload.fields.is_empty() => {
                Err(malformed("delete must not carry fields"))
            }
            _ => Ok(()),
        }
    }

    /// Records a rejection from the remote authority.
    pub fn record_rejection(&mut self, reason: impl Into<String>) {
        self.attempts = self.attempts.saturating_add(1);
        self.last_error = Some(reason.into());
    }
}

#[cfg(test)]
#[path = "mutation_tests.rs"]
mod tests;
