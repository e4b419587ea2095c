// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::open_engine;
use crate::engine::SyncEngine;
use crate::error::{Error, Result};
use crate::store::KeyValueStore;

pub fn run(ids: &[String], all: bool) -> Result<()> {
    let (engine, _, _) = open_engine()?;
    let marked = run_impl(&engine, ids, all)?;
    println!(
        "Marked {} read ({} unread)",
        marked,
        engine.unread_count()
    );
    Ok(())
}

/// Returns how many records changed from unread to read.
///
/// Every id must exist; already-read records are left alone.
pub(crate) fn run_impl<K: KeyValueStore + 'static>(
    engine: &SyncEngine<K>,
    ids: &[String],
    all: bool,
) -> Result<usize> {
    if all {
        return Ok(engine.mark_all_read());
    }

    let known = engine.notifications();
    if let Some(missing) = ids.iter().find(|id| !known.iter().any(|r| &r.id == *id)) {
        return Err(Error::NotificationNotFound(missing.clone()));
    }
    Ok(ids.iter().filter(|id| engine.mark_read(id)).count())
}

#[cfg(test)]
#[path = "read_tests.rs"]
mod tests;
