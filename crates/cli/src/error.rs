// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::store::StoreError;
use crate::sync::{ChannelError, QueueError, SyncError, TransportError};

/// All possible errors that can occur in the tide library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'tide init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("invalid {field} '{url}'\n  hint: expected a {expected} URL")]
    InvalidUrl {
        field: &'static str,
        url: String,
        expected: &'static str,
    },

    #[error("notification not found: {0}")]
    NotificationNotFound(String),

    #[error("invalid field '{0}'\n  hint: use name=value, where value is JSON or a plain string")]
    InvalidField(String),

    #[error("{0}")]
    Core(#[from] tide_core::Error),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Sync(#[from] SyncError),

    #[error("{0}")]
    Channel(#[from] ChannelError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),
}

/// A specialized Result type for tide operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<QueueError> for Error {
    fn from(e: QueueError) -> Self {
        Error::Sync(SyncError::Queue(e))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
