// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::{open_engine, runtime};
use crate::display::format_flush_report;
use crate::engine::SyncEngine;
use crate::error::Result;
use crate::store::KeyValueStore;
use crate::sync::FlushOutcome;

pub fn run() -> Result<()> {
    let (engine, _, _) = open_engine()?;
    let rt = runtime()?;
    for line in rt.block_on(run_impl(&engine))? {
        println!("{}", line);
    }
    Ok(())
}

/// Internal implementation that accepts the engine for testing.
///
/// Returns the lines to print.
pub(crate) async fn run_impl<K: KeyValueStore + 'static>(
    engine: &SyncEngine<K>,
) -> Result<Vec<String>> {
    let lines = match engine.flush().await? {
        FlushOutcome::Empty => vec!["Nothing to flush".to_string()],
        FlushOutcome::Skipped => vec!["A flush is already in progress".to_string()],
        FlushOutcome::Completed(report) => {
            let mut lines = format_flush_report(&report);
            let pending = engine.pending().len();
            if pending > 0 {
                lines.push(format!("{} mutations still queued", pending));
            }
            lines
        }
    };
    Ok(lines)
}

#[cfg(test)]
#[path = "flush_tests.rs"]
mod tests;
