// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use tide_core::MutationId;

use super::open_engine;
use crate::cli::OutputFormat;
use crate::display::{format_failed_line, format_mutation_line};
use crate::engine::SyncEngine;
use crate::error::Result;
use crate::store::KeyValueStore;

pub fn run(requeue: Option<String>, discard: Option<String>, output: OutputFormat) -> Result<()> {
    let (engine, _, _) = open_engine()?;
    for line in run_impl(&engine, requeue, discard, output)? {
        println!("{}", line);
    }
    Ok(())
}

/// Internal implementation that accepts the engine for testing.
pub(crate) fn run_impl<K: KeyValueStore + 'static>(
    engine: &SyncEngine<K>,
    requeue: Option<String>,
    discard: Option<String>,
    output: OutputFormat,
) -> Result<Vec<String>> {
    if let Some(id) = requeue {
        let mutation = engine.requeue(&MutationId::from(id))?;
        return Ok(vec![
            "Requeued:".to_string(),
            format_mutation_line(&mutation),
        ]);
    }

    if let Some(id) = discard {
        let failed = engine.discard(&MutationId::from(id))?;
        return Ok(vec![format!("Discarded {}", failed.mutation.id)]);
    }

    let failed = engine.failed();
    match output {
        OutputFormat::Json => Ok(vec![serde_json::to_string_pretty(&failed)?]),
        OutputFormat::Text if failed.is_empty() => {
            Ok(vec!["No failed mutations".to_string()])
        }
        OutputFormat::Text => Ok(failed.iter().map(format_failed_line).collect()),
    }
}

#[cfg(test)]
#[path = "failed_tests.rs"]
mod tests;
