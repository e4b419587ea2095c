// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tide-core: Shared data model for the tide sync engine
//!
//! This crate provides the mutation, notification and wire-protocol types
//! used by the engine and by anything speaking to the remote authority.

pub mod error;
pub mod mutation;
pub mod notification;
pub mod persisted;
pub mod protocol;

pub use error::{Error, Result};
pub use mutation::{Mutation, MutationId, MutationKind, MutationPayload};
pub use notification::{Category, NewNotification, NotificationRecord, Priority};
pub use protocol::{BatchItem, BatchRequest, BatchResponse, ItemResult, PushEvent};
