// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod clear;
pub mod failed;
pub mod flush;
pub mod init;
pub mod mutate;
pub mod notifications;
pub mod notify;
pub mod read;
pub mod run;
pub mod status;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{find_work_dir, log_path, state_dir, Config};
use crate::engine::{EngineConfig, SyncEngine};
use crate::error::{Error, Result};
use crate::store::{FileStore, PersistentStore};
use crate::sync::HttpBatchTransport;

/// Engine backed by the on-disk state directory.
pub type FileEngine = SyncEngine<FileStore>;

/// Open the engine for the enclosing project.
pub fn open_engine() -> Result<(Arc<FileEngine>, Config, PathBuf)> {
    let work_dir = find_work_dir()?;
    let config = Config::load(&work_dir)?;
    crate::logging::init(&log_path(&work_dir));
    let engine = open_engine_at(&work_dir, &config)?;
    Ok((engine, config, work_dir))
}

/// Open the engine for an already located `.tide/` directory.
///
/// Starts offline; the first successful flush or channel connect brings it
/// online.
pub fn open_engine_at(work_dir: &Path, config: &Config) -> Result<Arc<FileEngine>> {
    let store = PersistentStore::new(FileStore::open(&state_dir(work_dir))?);
    let transport = HttpBatchTransport::new(&config.remote.batch_url, config.request_timeout())?;
    Ok(Arc::new(SyncEngine::open(
        Arc::new(store),
        Box::new(transport),
        EngineConfig::from(config),
        false,
    )))
}

/// Build the runtime used by commands that talk to the network.
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Error::Io(std::io::Error::other(format!("tokio: {}", e))))
}
