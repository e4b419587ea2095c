// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Schema-tagged envelope for persisted values.
//!
//! Every value written to the key-value store is wrapped as
//! `{"schema": N, "data": ...}`. On load the tag is checked before the data
//! is decoded, so a shape written by an older or newer build is detected and
//! discarded instead of being misapplied.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    schema: u32,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    schema: u32,
    data: Value,
}

/// Encodes `data` under the given schema version.
pub fn encode<T: Serialize>(schema: u32, data: &T) -> Result<String> {
    Ok(serde_json::to_string(&EnvelopeRef { schema, data })?)
}

/// Decodes a value written by [`encode`].
///
/// Fails with [`Error::SchemaMismatch`] when the stored tag differs from
/// `expected`, and with [`Error::Json`] when the envelope or data is corrupt.
pub fn decode<T: DeserializeOwned>(key: &str, raw: &str, expected: u32) -> Result<T> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    if envelope.schema != expected {
        return Err(Error::SchemaMismatch {
            key: key.to_string(),
            expected,
            found: envelope.schema,
        });
    }
    Ok(serde_json::from_value(envelope.data)?)
}

#[cfg(test)]
#[path = "persisted_tests.rs"]
mod tests;
