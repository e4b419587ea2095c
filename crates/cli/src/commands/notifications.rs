// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::open_engine;
use crate::cli::OutputFormat;
use crate::display::format_notification_line;
use crate::engine::SyncEngine;
use crate::error::Result;
use crate::store::KeyValueStore;

pub fn run(unread: bool, output: OutputFormat) -> Result<()> {
    let (engine, _, _) = open_engine()?;
    for line in run_impl(&engine, unread, output)? {
        println!("{}", line);
    }
    Ok(())
}

/// Internal implementation that accepts the engine for testing.
pub(crate) fn run_impl<K: KeyValueStore + 'static>(
    engine: &SyncEngine<K>,
    unread: bool,
    output: OutputFormat,
) -> Result<Vec<String>> {
    let mut records = engine.notifications();
    if unread {
        records.retain(|r| !r.read);
    }

    match output {
        OutputFormat::Json => Ok(vec![serde_json::to_string_pretty(&records)?]),
        OutputFormat::Text => {
            let mut lines: Vec<String> = records.iter().map(format_notification_line).collect();
            if lines.is_empty() {
                lines.push("No notifications".to_string());
            }
            lines.push(format!("{} unread", engine.unread_count()));
            Ok(lines)
        }
    }
}

#[cfg(test)]
#[path = "notifications_tests.rs"]
mod tests;
