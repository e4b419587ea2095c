// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tide - An offline-first client sync engine.
//!
//! Changes are applied to a local optimistic copy of domain state and
//! queued durably, then flushed in order to a remote authority whenever a
//! connection is available. A reconnecting push channel delivers
//! server-initiated events into a capped notification center.
//!
//! # Main Components
//!
//! - [`SyncEngine`] - Service object tying the components together
//! - [`sync`] - Mutation queue, flush coordinator, transports and push channel
//! - [`connectivity`] - Settled online/offline transitions
//! - [`notifications`] - Capped, deduplicated notification history
//! - [`state`] - Optimistic entity snapshot with rollback
//! - [`store`] - Fail-soft key-value persistence
//! - [`Config`] - Project configuration in `.tide/config.toml`
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tide::store::{MemoryStore, PersistentStore};
//! use tide::sync::HttpBatchTransport;
//! use tide::{EngineConfig, SyncEngine};
//!
//! let store = Arc::new(PersistentStore::new(MemoryStore::new()));
//! let transport = HttpBatchTransport::new("https://api.example.com/batch", timeout)?;
//! let engine = Arc::new(SyncEngine::open(store, Box::new(transport), EngineConfig::default(), false));
//! engine.mutate(mutation)?;
//! engine.flush().await?;
//! ```

mod cli;
mod commands;
mod display;
mod logging;

pub mod config;
pub mod connectivity;
pub mod engine;
pub mod error;
pub mod notifications;
pub mod state;
pub mod store;
pub mod sync;

pub use cli::{Cli, Command, OutputArgs, OutputFormat};
pub use config::{find_work_dir, init_work_dir, Config};
pub use engine::{EngineConfig, EngineStatus, SyncEngine};
pub use error::{Error, Result};

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Init {
            path,
            batch_url,
            push_url,
        } => commands::init::run(path, batch_url, push_url),
        Command::Status { output } => commands::status::run(output.output),
        Command::Mutate {
            kind,
            collection,
            entity_id,
            fields,
        } => commands::mutate::run(kind, &collection, &entity_id, &fields),
        Command::Flush => commands::flush::run(),
        Command::Failed {
            requeue,
            discard,
            output,
        } => commands::failed::run(requeue, discard, output.output),
        Command::Notifications { unread, output } => {
            commands::notifications::run(unread, output.output)
        }
        Command::Notify {
            message,
            category,
            priority,
        } => commands::notify::run(&message, category, priority),
        Command::Read { ids, all } => commands::read::run(&ids, all),
        Command::Clear { ids } => commands::clear::run(&ids),
        Command::Run => commands::run::run(),
    }
}
