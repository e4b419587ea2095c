// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Key-value persistence for the subset of state that survives restarts.
//!
//! Only the mutation queue, the permanent-failure log, the notification
//! history and display preferences are persisted. Entity state is
//! rehydrated from the remote authority instead.
//!
//! [`KeyValueStore`] is the storage seam: [`FileStore`] writes one file per
//! key using write-then-rename so an interrupted write never corrupts the
//! previous value, and [`MemoryStore`] backs tests. A [`FileStore`] holds an
//! exclusive lock on its directory for as long as it is open, so only one
//! process at a time owns the persisted queue. [`PersistentStore`] adds
//! the schema-tagged envelope and fail-soft loading on top.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tide_core::persisted;

/// Schema version written with every persisted value.
pub const SCHEMA_VERSION: u32 = 1;

/// Keys used by the engine.
pub mod keys {
    pub const QUEUE: &str = "queue";
    pub const FAILED: &str = "failed";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const PREFERENCES: &str = "preferences";
}

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding error.
    #[error("encoding error: {0}")]
    Encoding(#[from] tide_core::Error),

    /// Key contains characters that are not safe as a file name.
    #[error("invalid store key: '{0}'")]
    InvalidKey(String),

    /// Another open store holds the directory lock.
    #[error("{} is in use by another tide process\n  hint: stop 'tide run' or wait for the other command to finish", .0.display())]
    Locked(PathBuf),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Minimal string key-value storage.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Name of the lock file inside a [`FileStore`] directory.
pub const LOCK_FILE: &str = "tide.lock";

/// Directory-backed store, one `<key>.json` file per key.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    // Released when the store is dropped
    _lock: File,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    ///
    /// Fails with [`StoreError::Locked`] if another store, in this or any
    /// other process, has the directory open.
    pub fn open(dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;
        let lock = acquire_lock(&dir.join(LOCK_FILE))?;
        Ok(FileStore {
            dir: dir.to_path_buf(),
            _lock: lock,
        })
    }

    /// Returns the directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let tmp_path = path.with_extension("json.tmp");

        // Write the new value aside, then swap it in
        let mut file = File::create(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn acquire_lock(lock_path: &Path) -> StoreResult<File> {
    use fs2::FileExt;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;

    file.try_lock_exclusive().map_err(|e| {
        tracing::debug!("Lock on {} not acquired: {}", lock_path.display(), e);
        StoreError::Locked(lock_path.parent().unwrap_or(lock_path).to_path_buf())
    })?;

    Ok(file)
}

/// Typed, schema-checked access to a [`KeyValueStore`].
#[derive(Debug)]
pub struct PersistentStore<K: KeyValueStore> {
    kv: K,
}

impl<K: KeyValueStore> PersistentStore<K> {
    pub fn new(kv: K) -> Self {
        PersistentStore { kv }
    }

    /// Returns the underlying key-value store.
    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Loads the value under `key`, or `T::default()` if it is missing,
    /// unreadable, corrupt or written under another schema version.
    ///
    /// Never fails: a bad persisted value must not prevent startup.
    pub fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let raw = match self.kv.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                tracing::warn!("Failed to read persisted '{}', starting empty: {}", key, e);
                return T::default();
            }
        };

        match persisted::decode(key, &raw, SCHEMA_VERSION) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Discarding persisted '{}': {}", key, e);
                T::default()
            }
        }
    }

    /// Saves `value` under `key`.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = persisted::encode(SCHEMA_VERSION, value)?;
        self.kv.set(key, &raw)
    }

    /// Saves `value` under `key`, logging instead of returning failures.
    ///
    /// The in-memory value stays authoritative; the next successful save
    /// brings the persisted copy back in line.
    pub fn save_logged<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.save(key, value) {
            tracing::warn!("Failed to persist '{}': {}", key, e);
        }
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
