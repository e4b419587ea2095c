// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::open_engine;
use crate::engine::SyncEngine;
use crate::error::{Error, Result};
use crate::store::KeyValueStore;

pub fn run(ids: &[String]) -> Result<()> {
    let (engine, _, _) = open_engine()?;
    let removed = run_impl(&engine, ids)?;
    println!("Removed {} notifications", removed);
    Ok(())
}

/// Remove the given notifications, or all of them when `ids` is empty.
pub(crate) fn run_impl<K: KeyValueStore + 'static>(
    engine: &SyncEngine<K>,
    ids: &[String],
) -> Result<usize> {
    if ids.is_empty() {
        let count = engine.notifications().len();
        engine.clear_notifications();
        return Ok(count);
    }

    for id in ids {
        if engine.remove_notification(id).is_none() {
            return Err(Error::NotificationNotFound(id.clone()));
        }
    }
    Ok(ids.len())
}

#[cfg(test)]
#[path = "clear_tests.rs"]
mod tests;
