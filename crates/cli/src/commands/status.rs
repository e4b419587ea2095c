// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde_json::json;

use super::open_engine;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_mutation_line;
use crate::engine::SyncEngine;
use crate::error::Result;
use crate::store::KeyValueStore;

pub fn run(output: OutputFormat) -> Result<()> {
    let (engine, config, _) = open_engine()?;
    for line in run_impl(&engine, &config, output)? {
        println!("{}", line);
    }
    Ok(())
}

/// Internal implementation that accepts the engine for testing.
///
/// Connectivity is not reported: it is only known to a running engine.
pub(crate) fn run_impl<K: KeyValueStore + 'static>(
    engine: &SyncEngine<K>,
    config: &Config,
    output: OutputFormat,
) -> Result<Vec<String>> {
    let status = engine.status();
    let pending = engine.pending();

    if output == OutputFormat::Json {
        let value = json!({
            "batch_url": config.remote.batch_url,
            "push_url": config.remote.push_url,
            "pending": pending,
            "failed": status.failed,
            "notifications": status.notifications,
            "unread": status.unread,
        });
        return Ok(vec![serde_json::to_string_pretty(&value)?]);
    }

    let mut lines = vec![
        format!("Batch endpoint: {}", config.remote.batch_url),
        format!("Push channel: {}", config.remote.push_url),
        format!("Pending mutations: {}", status.pending),
    ];
    lines.extend(pending.iter().map(|m| format!("  {}", format_mutation_line(m))));
    lines.push(format!("Failed mutations: {}", status.failed));
    lines.push(format!(
        "Notifications: {} ({} unread)",
        status.notifications, status.unread
    ));
    Ok(lines)
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
