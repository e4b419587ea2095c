// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory snapshot of domain entities.
//!
//! Mutations are applied optimistically as they are accepted. The store
//! remembers each entity's prior value per mutation so that a permanently
//! failed mutation can be undone. Entities themselves are never persisted;
//! after a restart they are rebuilt by re-applying the pending queue, or by
//! [`StateStore::hydrate`] from a remote snapshot.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use tide_core::{Mutation, MutationId, MutationKind};

/// Field map of one entity.
pub type Fields = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    pub collection: String,
    pub id: String,
}

impl EntityKey {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        EntityKey {
            collection: collection.into(),
            id: id.into(),
        }
    }

    fn of(mutation: &Mutation) -> Self {
        let (collection, id) = mutation.target();
        EntityKey::new(collection, id)
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

#[derive(Debug, Clone)]
struct Undo {
    key: EntityKey,
    previous: Option<Fields>,
}

#[derive(Debug, Clone, Default)]
pub struct StateStore {
    entities: BTreeMap<EntityKey, Fields>,
    undo: HashMap<MutationId, Undo>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a mutation optimistically.
    ///
    /// Creates replace the entity, updates merge their fields into it
    /// (creating it if absent), deletes remove it.
    pub fn apply(&mut self, mutation: &Mutation) {
        let key = EntityKey::of(mutation);
        let previous = self.entities.get(&key).cloned();

        match mutation.kind {
            MutationKind::Create => {
                self.entities
                    .insert(key.clone(), mutation.payload.fields.clone());
            }
            MutationKind::Update => {
                let entity = self.entities.entry(key.clone()).or_default();
                for (name, value) in &mutation.payload.fields {
                    entity.insert(name.clone(), value.clone());
                }
            }
            MutationKind::Delete => {
                self.entities.remove(&key);
            }
        }

        self.undo.insert(mutation.id.clone(), Undo { key, previous });
    }

    /// Forget the undo record of an acknowledged mutation.
    pub fn acknowledge(&mut self, id: &MutationId) {
        self.undo.remove(id);
    }

    /// Restore the entity touched by `id` to its value before the mutation.
    ///
    /// Returns the restored key, or `None` if nothing is known about `id`.
    pub fn rollback(&mut self, id: &MutationId) -> Option<EntityKey> {
        let Undo { key, previous } = self.undo.remove(id)?;
        match previous {
            Some(fields) => {
                self.entities.insert(key.clone(), fields);
            }
            None => {
                self.entities.remove(&key);
            }
        }
        tracing::info!("Rolled back {} after mutation {}", key, id);
        Some(key)
    }

    /// Replace the baseline with a remote snapshot and re-apply pending
    /// mutations in order.
    pub fn hydrate<'a>(
        &mut self,
        entities: impl IntoIterator<Item = (EntityKey, Fields)>,
        pending: impl IntoIterator<Item = &'a Mutation>,
    ) {
        self.entities = entities.into_iter().collect();
        self.undo.clear();
        let mut replayed = 0;
        for mutation in pending {
            self.apply(mutation);
            replayed += 1;
        }
        tracing::debug!(
            "Hydrated {} entities, replayed {} pending mutations",
            self.entities.len(),
            replayed
        );
    }

    pub fn get(&self, collection: &str, id: &str) -> Option<&Fields> {
        self.entities.get(&EntityKey::new(collection, id))
    }

    /// Entities of one collection, ordered by id.
    pub fn collection<'a>(
        &'a self,
        collection: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Fields)> + 'a {
        self.entities
            .iter()
            .filter(move |(k, _)| k.collection == collection)
            .map(|(k, v)| (k.id.as_str(), v))
    }

    pub fn entities(&self) -> impl Iterator<Item = (&EntityKey, &Fields)> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
