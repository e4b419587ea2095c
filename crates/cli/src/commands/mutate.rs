// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::Value;
use tide_core::{Mutation, MutationId, MutationKind, MutationPayload};

use super::open_engine;
use crate::engine::SyncEngine;
use crate::error::{Error, Result};
use crate::store::KeyValueStore;

pub fn run(
    kind: MutationKind,
    collection: &str,
    entity_id: &str,
    fields: &[String],
) -> Result<()> {
    let (engine, _, _) = open_engine()?;
    let id = run_impl(&engine, kind, collection, entity_id, fields)?;
    println!(
        "Queued {} of {}/{} ({} pending)",
        kind,
        collection,
        entity_id,
        engine.pending().len()
    );
    println!("Mutation id: {}", id);
    Ok(())
}

/// Internal implementation that accepts the engine for testing.
pub(crate) fn run_impl<K: KeyValueStore + 'static>(
    engine: &SyncEngine<K>,
    kind: MutationKind,
    collection: &str,
    entity_id: &str,
    fields: &[String],
) -> Result<MutationId> {
    let mut payload = MutationPayload::new(collection.trim(), entity_id.trim());
    for field in fields {
        let (name, value) = parse_field(field)?;
        payload = payload.with_field(name, value);
    }
    engine.mutate(Mutation::new(kind, payload))
}

/// Parse `name=value`. The value is JSON if it parses, otherwise a string.
pub(crate) fn parse_field(field: &str) -> Result<(String, Value)> {
    let (name, raw) = field
        .split_once('=')
        .ok_or_else(|| Error::InvalidField(field.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidField(field.to_string()));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

#[cfg(test)]
#[path = "mutate_tests.rs"]
mod tests;
