// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronization with the remote authority.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌────────────────┐     ┌─────────────┐
//! │ SyncCoordinator  │────►│ BatchTransport │────►│   Remote    │
//! │   (flush)        │◄────│    (trait)     │◄────│  Authority  │
//! └──────────────────┘     └────────────────┘     └─────────────┘
//!        │                                               │
//!        ▼                                               ▼
//! ┌──────────────────┐     ┌────────────────┐     ┌─────────────┐
//! │  MutationQueue   │     │ RealtimeChannel│◄────│PushTransport│
//! │ (durable, FIFO)  │     │   (backoff)    │     │   (trait)   │
//! └──────────────────┘     └────────────────┘     └─────────────┘
//! ```
//!
//! # Features
//!
//! - Durable FIFO queue with a permanent-failure log
//! - Single in-flight batch flush with per-item reconciliation
//! - Push channel with bounded exponential backoff and jitter
//! - Injectable transport traits for testing

mod channel;
mod coordinator;
mod queue;
mod transport;

pub use channel::{
    backoff_delay, ChannelConfig, ChannelError, ChannelEvent, ChannelState, ChannelStatus,
    RealtimeChannel,
};
pub use coordinator::{
    FlushOutcome, FlushReport, SyncConfig, SyncCoordinator, SyncError, SyncResult, SyncState,
    DEFAULT_MAX_ATTEMPTS,
};
pub use queue::{FailedMutation, MutationQueue, QueueError, QueueResult};
pub use transport::{
    BatchTransport, HttpBatchTransport, PushTransport, TransportError, TransportFuture,
    TransportResult, WebSocketTransport,
};

#[cfg(test)]
pub(crate) mod test_helpers;
