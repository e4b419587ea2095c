// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tide-core operations.

use thiserror::Error;

/// All possible errors that can occur in tide-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed mutation {id}: {reason}")]
    MalformedMutation { id: String, reason: String },

    #[error("invalid mutation kind: '{0}'\n  hint: valid kinds are: create, update, delete")]
    InvalidKind(String),

    #[error("invalid notification category: '{0}'\n  hint: valid categories are: system, sync, activity, alert")]
    InvalidCategory(String),

    #[error("invalid notification priority: '{0}'\n  hint: valid priorities are: low, normal, high, urgent")]
    InvalidPriority(String),

    #[error("schema mismatch for '{key}': expected v{expected}, found v{found}")]
    SchemaMismatch {
        key: String,
        expected: u32,
        found: u32,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for tide-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
