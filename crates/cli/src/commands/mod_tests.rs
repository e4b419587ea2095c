// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

//! Test infrastructure for command testing without filesystem setup.
//!
//! `TestContext` wraps an engine over an in-memory store and a mock batch
//! endpoint, so command logic can be exercised without a `.tide/`
//! directory or a network.
//!
//! ```rust,ignore
//! use crate::commands::testing::TestContext;
//!
//! #[test]
//! fn test_some_command() {
//!     let ctx = TestContext::new();
//!     ctx.queue_update("t1");
//!     // run the command's run_impl against ctx.engine
//! }
//! ```

use std::sync::Arc;

use serde_json::json;
use tide_core::{Category, Mutation, MutationId, MutationKind, MutationPayload, NewNotification};

use crate::config::Config;
use crate::engine::{EngineConfig, SyncEngine};
use crate::store::{MemoryStore, PersistentStore};
use crate::sync::test_helpers::MockBatchTransport;
use crate::sync::SyncConfig;

pub struct TestContext {
    pub engine: SyncEngine<MemoryStore>,
    pub mock: MockBatchTransport,
    pub config: Config,
    pub store: Arc<PersistentStore<MemoryStore>>,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_max_attempts(SyncConfig::default().max_attempts)
    }

    /// Context whose mutations fail permanently once rejected more than
    /// `max_attempts` times.
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        let store = Arc::new(PersistentStore::new(MemoryStore::new()));
        let mock = MockBatchTransport::new();
        let config = Config::default();
        let engine_config = EngineConfig {
            sync: SyncConfig { max_attempts },
            ..EngineConfig::from(&config)
        };
        let engine = SyncEngine::open(
            Arc::clone(&store),
            Box::new(mock.clone()),
            engine_config,
            false,
        );
        TestContext {
            engine,
            mock,
            config,
            store,
        }
    }

    /// Queue an update of `tasks/<entity>`.
    pub fn queue_update(&self, entity: &str) -> MutationId {
        self.engine
            .mutate(Mutation::new(
                MutationKind::Update,
                MutationPayload::new("tasks", entity).with_field("title", json!(entity)),
            ))
            .expect("queue update")
    }

    /// Add a notification with a fixed id.
    pub fn notify(&self, id: &str, message: &str) -> &Self {
        self.engine
            .notify(NewNotification::new(Category::Alert, message).with_id(id));
        self
    }

    /// Flush once, rejecting mutations on the given entities.
    pub fn flush_rejecting(&self, entities: &[&str]) {
        self.mock.reject(entities);
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        rt.block_on(self.engine.flush()).expect("flush");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::open_engine_at;
    use crate::error::Error;
    use crate::store::StoreError;
    use tempfile::TempDir;

    #[test]
    fn test_engines_on_one_directory_are_exclusive() {
        let temp = TempDir::new().unwrap();
        let config = Config::default();

        let first = open_engine_at(temp.path(), &config).unwrap();
        let second = open_engine_at(temp.path(), &config);
        assert!(matches!(
            second,
            Err(Error::Store(StoreError::Locked(_)))
        ));

        first
            .mutate(Mutation::new(
                MutationKind::Update,
                MutationPayload::new("tasks", "from-first").with_field("title", json!("x")),
            ))
            .unwrap();
        drop(first);

        let reopened = open_engine_at(temp.path(), &config).unwrap();
        let pending = reopened.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].payload.entity_id, "from-first");
    }

    #[test]
    fn test_context_starts_empty() {
        let ctx = TestContext::new();
        assert!(ctx.engine.pending().is_empty());
        assert!(ctx.engine.notifications().is_empty());
    }
}
